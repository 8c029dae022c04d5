use std::collections::BTreeMap;

use form_def::{
    Field, FileStore, FormGateway, Widget, extract_response_value, is_data_bearing, widget,
};

use crate::builder::{prompt_bool, prompt_line};
use crate::{CliResult, submit_values};

/// Interactive fill-mode session over a resolved form: headings become
/// section text, required inputs re-prompt until answered, and a recorded
/// submission clears the collected values so the respondent can submit
/// again.
pub fn run_fill_session(
    gateway: &mut FormGateway<FileStore>,
    form_id: &str,
) -> CliResult<()> {
    loop {
        let definition = gateway.resolve(form_id)?;
        println!("Form: {}", definition.name);

        let mut values = BTreeMap::new();
        for field in &definition.fields {
            if !is_data_bearing(field.kind) {
                println!("== {} ==", field.label);
                continue;
            }
            if let Some(value) = collect_value(field)? {
                values.insert(field.response_key(), value);
            }
        }

        let count = submit_values(gateway, form_id, values)?;
        println!("Thanks! Your response has been recorded ({count} total).");

        if !prompt_bool("Submit another response?", false)? {
            break;
        }
    }
    Ok(())
}

fn collect_value(field: &Field) -> CliResult<Option<String>> {
    let marker = if field.required { " *" } else { "" };
    loop {
        let answer = match widget(field.kind) {
            Widget::Select { options, .. } | Widget::RadioGroup { options } => {
                for (index, option) in options.iter().enumerate() {
                    println!("  {}. {}", index + 1, option);
                }
                let Some(text) = prompt_line(&format!("{}{} (number)", field.label, marker))?
                else {
                    return Err("input ended before the form was complete".into());
                };
                if text.is_empty() {
                    text
                } else {
                    let resolved = resolve_option(&text, options);
                    if resolved.is_empty() {
                        println!("Please pick one of the listed options.");
                        continue;
                    }
                    resolved
                }
            }
            _ => {
                let Some(text) = prompt_line(&format!("{}{}", field.label, marker))? else {
                    return Err("input ended before the form was complete".into());
                };
                text
            }
        };

        match extract_response_value(field, Some(&answer)) {
            Some(value) if !value.is_empty() => return Ok(Some(value)),
            _ if field.required => println!("This field is required."),
            _ => return Ok(None),
        }
    }
}

/// Accept either an option number or the option text itself; anything
/// else comes back empty so the caller re-prompts.
fn resolve_option(input: &str, options: &[&str]) -> String {
    if let Ok(index) = input.parse::<usize>()
        && index >= 1
        && index <= options.len()
    {
        return options[index - 1].to_string();
    }
    options
        .iter()
        .find(|option| option.eq_ignore_ascii_case(input))
        .map(|option| option.to_string())
        .unwrap_or_default()
}
