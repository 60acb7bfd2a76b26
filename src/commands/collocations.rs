use nu_plugin::{EngineInterface, EvaluatedCall, PluginCommand};
use nu_protocol::{
    Category, Example, LabeledError, ListStream, PipelineData, Record, Signature, Signals,
    SyntaxShape, Type, Value,
};
use rayon::prelude::*;

use super::util::{append_column, normalize_input, row_text, usize_flag};
use crate::algo::collocation::collocations;
use crate::algo::stem::PhraseStemmer;
use crate::algo::tokenizer;
use crate::KeyphrasePlugin;

pub struct Collocations;

impl PluginCommand for Collocations {
    type Plugin = KeyphrasePlugin;

    fn name(&self) -> &str {
        "keyphrase collocations"
    }

    fn description(&self) -> &str {
        "Find frequent multi-word phrases in text"
    }

    fn signature(&self) -> Signature {
        Signature::build(self.name())
            .input_output_types(vec![
                (Type::table(), Type::table()),
                (Type::String, Type::table()),
                (Type::List(Box::new(Type::String)), Type::table()),
            ])
            .named(
                "field",
                SyntaxShape::String,
                "Field containing text (default: content)",
                Some('f'),
            )
            .named(
                "min",
                SyntaxShape::Int,
                "Shortest collocation in words (default: 2)",
                None,
            )
            .named(
                "max",
                SyntaxShape::Int,
                "Longest collocation in words (default: 5)",
                None,
            )
            .category(Category::Experimental)
    }

    fn search_terms(&self) -> Vec<&str> {
        vec!["collocation", "ngram", "phrase", "bigram"]
    }

    fn examples(&self) -> Vec<Example<'_>> {
        vec![Example {
            example: "open --raw article.txt | keyphrase collocations --max 3",
            description: "List phrases of two or three words that recur in an article",
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
        let field: String = call
            .get_flag::<String>("field")?
            .unwrap_or_else(|| "content".into());
        let min = usize_flag(call, "min")?.unwrap_or(2).max(2);
        let max = usize_flag(call, "max")?.unwrap_or(5);
        let head = call.head;

        if max < min {
            return Err(LabeledError::new(format!(
                "Invalid collocation length range {min}..={max} (minimum is 2)"
            ))
            .with_label("check --min and --max", head));
        }

        let rows = normalize_input(input, head);
        let texts: Vec<String> = rows.iter().map(|row| row_text(row, &field)).collect();

        let found: Vec<Vec<(String, usize)>> = texts
            .par_iter()
            .map(|text| {
                let stemmer = PhraseStemmer::new();
                let tokens = tokenizer::tokenize(text, &stemmer);
                let mut counts: Vec<(String, String, usize)> = Vec::new();
                for gram in collocations(&tokens, min, max) {
                    match counts.iter_mut().find(|(_, stem, _)| *stem == gram.stem) {
                        Some(entry) => entry.2 += 1,
                        None => counts.push((gram.value.to_lowercase(), gram.stem, 1)),
                    }
                }
                counts.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
                counts.into_iter().map(|(value, _, n)| (value, n)).collect()
            })
            .collect();

        let results: Vec<Value> = rows
            .into_iter()
            .zip(found)
            .map(|(row, phrases)| {
                let list = phrases
                    .into_iter()
                    .map(|(value, count)| {
                        let mut record = Record::new();
                        record.push("value", Value::string(value, head));
                        record.push("count", Value::int(count as i64, head));
                        Value::record(record, head)
                    })
                    .collect();
                append_column(row, "_collocations", Value::list(list, head), head)
            })
            .collect();

        Ok(ListStream::new(results.into_iter(), head, Signals::empty()).into())
    }
}
