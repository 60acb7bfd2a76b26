use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Signature, Signals, SyntaxShape,
    Type, Value,
};

use super::util::{append_column, keyphrase_list, normalize_input, row_text, usize_flag};
use crate::algo::tagger::{TaggerSettings, TaggingType};
use crate::ops;
use crate::KeyphrasePlugin;

pub struct Tag;

impl PluginCommand for Tag {
    type Plugin = KeyphrasePlugin;

    fn name(&self) -> &str {
        "keyphrase tag"
    }

    fn description(&self) -> &str {
        "Assign tags from a trained controlled vocabulary"
    }

    fn extra_description(&self) -> &str {
        "Train the model first with `keyphrase train-tagger`. Adds a `_tags` column of {value, weight} records."
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
                "Tagger model file (or model name with --store)",
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
                "Assign exactly this many tags per item",
                Some('n'),
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["tags", "tagging", "controlled", "vocabulary", "keywords"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![
            Example {
                example: "open bookmarks.json | keyphrase tag --model tagger.json",
                description: "Tag every bookmark with the trained vocabulary",
                result: None,
            },
            Example {
                example: r#""Weekend trip to Los Angeles" | keyphrase tag -m tagger.json -n 3"#,
                description: "Assign the three best tags to a string",
                result: None,
            },
        ]
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

        let mut tagger = ops::load_tagger(&model, store.as_deref())
            .map_err(|e| LabeledError::new(e).with_label("cannot load tagger", head))?;
        if let Some(n) = count {
            let settings = TaggerSettings {
                tagging_type: TaggingType::FixedCount,
                tag_count: n,
                ..tagger.settings().clone()
            };
            tagger
                .set_settings(settings)
                .map_err(|e| LabeledError::new(e.to_string()))?;
        }

        let rows = normalize_input(input, head);
        if rows.is_empty() {
            return Ok(PipelineData::Value(Value::list(vec![], head), None));
        }

        let texts: Vec<String> = rows.iter().map(|row| row_text(row, &field)).collect();
        let tags = tagger.tag_all(&texts);

        let results: Vec<Value> = rows
            .into_iter()
            .zip(tags)
            .map(|(row, tags)| append_column(row, "_tags", keyphrase_list(&tags, head), head))
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}
