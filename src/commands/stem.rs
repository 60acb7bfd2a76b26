use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, PipelineData, Record, Signature, Type, Value,
};

use crate::algo::stem::{canonical, PhraseStemmer};
use crate::algo::tokenizer;
use crate::KeyphrasePlugin;

pub struct Stem;

impl PluginCommand for Stem {
    type Plugin = KeyphrasePlugin;

    fn name(&self) -> &str {
        "keyphrase stem"
    }

    fn description(&self) -> &str {
        "Stem words or phrases and show their canonical keyphrase key"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::String, Type::table()),
                (Type::List(Box::new(Type::String)), Type::table()),
            ])
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["stem", "snowball", "porter", "normalize"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: r#"["Machine Learning" "learning machines"] | keyphrase stem"#,
            description: "Both phrases share the key 'learn machin'",
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
        let head = call.head;
        let stemmer = PhraseStemmer::new();

        let mut rows = Vec::new();
        for value in input.into_iter() {
            let phrase = value.coerce_into_string().map_err(|e| {
                LabeledError::new(e.to_string()).with_label("expected a string", head)
            })?;
            let stems: Vec<String> = tokenizer::words(&phrase)
                .iter()
                .map(|w| stemmer.stem(w))
                .collect();
            let key = canonical(&stems.join(" "));

            let mut record = Record::new();
            record.push("phrase", Value::string(phrase, head));
            record.push(
                "stems",
                Value::list(stems.into_iter().map(|s| Value::string(s, head)).collect(), head),
            );
            record.push("key", Value::string(key, head));
            rows.push(Value::record(record, head));
        }

        Ok(PipelineData::Value(Value::list(rows, head), None))
    }
}
