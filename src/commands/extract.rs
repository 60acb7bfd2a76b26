use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, SyntaxShape,
    Type, Value,
};

use super::util::{append_column, keyphrase_list, normalize_input, row_text, usize_flag};
use crate::algo::extractor::ExtractorSettings;
use crate::algo::keyphrase::Extractor;
use crate::algo::rerank::AssignmentMode;
use crate::ops;
use crate::KeyphrasePlugin;

pub struct Extract;

impl PluginCommand for Extract {
    type Plugin = KeyphrasePlugin;

    fn name(&self) -> &str {
        "keyphrase extract"
    }

    fn description(&self) -> &str {
        "Extract keyphrases with a trained extractor"
    }

    fn extra_description(&self) -> &str {
        "Train the model first with `keyphrase train-extractor`. Adds a `_keyphrases` column of {value, weight} records."
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::String, Type::table()),
                (Type::List(Box::new(Type::String)), Type::table()),
            ])
            .required_named(
                "model",
                SyntaxShape::Filepath,
                "Extractor model file (or model name with --store)",
                Some('m'),
            )
            .named(
                "store",
                SyntaxShape::Filepath,
                "SQLite model store",
                None,
            )
            .named(
                "field",
                SyntaxShape::String,
                "Field containing text (default: content)",
                Some('f'),
            )
            .named(
                "count",
                SyntaxShape::Int,
                "Assign exactly this many keyphrases per item",
                Some('n'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["keyphrase", "keywords", "extract", "summary", "terms"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open articles.json | keyphrase extract --model extractor.json --count 5",
            description: "Extract the five best keyphrases per article",
            result: None,
        }]
    }

    fn run(
        &self,
        _plugin: &KeyphrasePlugin,
        _engine: &EngineInterface,
        call: &EvaluatedCall,
        input: PipelineData,
    ) -> Result<PipelineData, LabeledError> {
        let model: String = call
            .get_flag::<String>("model")?
            .ok_or_else(|| LabeledError::new("--model is required").with_label("missing flag", call.head))?;
        let store: Option<String> = call.get_flag("store")?;
        let field: String = call
            .get_flag::<String>("field")?
            .unwrap_or_else(|| "content".into());
        let count = usize_flag(call, "count")?;
        let head = call.head;

        let mut extractor = ops::load_extractor(&model, store.as_deref())
            .map_err(|e| LabeledError::new(e).with_label("cannot load extractor", head))?;
        if let Some(n) = count {
            let settings = ExtractorSettings {
                assignment_mode: AssignmentMode::FixedCount,
                keyphrase_count: n,
                ..extractor.settings().clone()
            };
            extractor
                .set_settings(settings)
                .map_err(|e| LabeledError::new(e.to_string()))?;
        }

        let rows = normalize_input(input, head);
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let keyphrases = extractor
                .extract(&row_text(&row, &field))
                .map_err(|e| LabeledError::new(e.to_string()).with_label("extraction failed", head))?;
            results.push(append_column(
                row,
                "_keyphrases",
                keyphrase_list(&keyphrases, head),
                head,
            ));
        }

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}
