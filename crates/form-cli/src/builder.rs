use std::io::{self, Write};

use form_def::{
    Field, FieldDraft, FieldEditor, FieldModel, FieldType, FileStore, FormGateway, Renderer,
    StoreError, default_label,
};

use crate::CliResult;

/// Editor backed by stdin prompts: the CLI's stand-in for the builder
/// page's blocking dialogs.
pub struct ConsoleEditor;

impl FieldEditor for ConsoleEditor {
    fn draft_field(&mut self, kind: FieldType) -> Option<FieldDraft> {
        let suggestion = default_label(kind);
        let label = prompt_line(&format!("Label (e.g. \"{suggestion}\")")).ok()??;
        if label.is_empty() {
            return None;
        }
        let required = if kind == FieldType::Heading {
            false
        } else {
            prompt_bool("Required?", false).ok()?
        };
        Some(FieldDraft { label, required })
    }

    fn confirm_delete(&mut self, field: &Field) -> bool {
        prompt_bool(
            &format!("Delete field '{}' ({})?", field.label, field.id),
            false,
        )
        .unwrap_or(false)
    }
}

/// Interactive authoring loop. Every mutation re-prints the whole field
/// list, matching the full-region re-render of the builder view.
pub fn run_builder_session(
    gateway: &mut FormGateway<FileStore>,
    base: &str,
) -> CliResult<()> {
    println!("Interactive form builder");
    println!(
        "Field types: {}",
        FieldType::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Commands: add <type>, edit <id>, copy <id>, delete <id>, list, preview, publish <name>, done");

    let mut model = FieldModel::new();
    let mut editor = ConsoleEditor;
    let renderer = Renderer::new()?;

    loop {
        let Some(line) = prompt_line("builder>")? else {
            break;
        };
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line.as_str(), ""),
        };

        match command {
            "add" => {
                let Ok(kind) = rest.parse::<FieldType>() else {
                    println!("Unknown field type '{rest}'.");
                    continue;
                };
                match model.add_field(kind, &mut editor) {
                    Some(field) => println!("Added {} as {}.", kind, field.id),
                    None => println!("Add abandoned."),
                }
                print_fields(&model);
            }
            "edit" => {
                if model.field(rest).is_none() {
                    println!("No field with id '{rest}'.");
                    continue;
                }
                let new_label = prompt_line("Enter new label")?.unwrap_or_default();
                if model.edit_label(rest, &new_label) {
                    print_fields(&model);
                } else {
                    println!("Label unchanged.");
                }
            }
            "copy" => {
                match model.duplicate_field(rest) {
                    Some(field) => println!("Copied as {}.", field.id),
                    None => println!("No field with id '{rest}'."),
                }
                print_fields(&model);
            }
            "delete" => {
                model.delete_field(rest, &mut editor);
                print_fields(&model);
            }
            "list" => print_fields(&model),
            "preview" => println!("{}", renderer.render_builder(model.fields())?),
            "publish" => {
                if rest.is_empty() {
                    println!("Usage: publish <name>");
                    continue;
                }
                match gateway.publish(rest, &model.snapshot(), base) {
                    Ok(published) => {
                        println!("Published: {}", published.form_id);
                        println!("Share this link: {}", published.link);
                    }
                    Err(StoreError::EmptyForm) => {
                        println!("Nothing to publish yet; add at least one field.");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            "done" | "quit" | "exit" => break,
            "" => {}
            other => println!("Unknown command '{other}'."),
        }
    }

    Ok(())
}

fn print_fields(model: &FieldModel) {
    if model.is_empty() {
        println!("(empty form)");
        return;
    }
    for (index, field) in model.fields().iter().enumerate() {
        let mut entry = format!("{}. [{}] {} ({})", index + 1, field.kind, field.label, field.id);
        if field.required {
            entry.push_str(" *");
        }
        println!("{entry}");
    }
}

/// Read one trimmed line; `None` only when stdin is closed. An empty
/// answer comes back as an empty string so callers can apply their own
/// abandoned-prompt semantics.
pub(crate) fn prompt_line(label: &str) -> io::Result<Option<String>> {
    print!("{label} ");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

pub(crate) fn prompt_bool(label: &str, default: bool) -> io::Result<bool> {
    let hint = if default { "Y/n" } else { "y/N" };
    loop {
        match prompt_line(&format!("{label} [{hint}]"))?.as_deref() {
            None | Some("") => return Ok(default),
            Some(answer) => match answer.to_lowercase().as_str() {
                "y" | "yes" | "true" => return Ok(true),
                "n" | "no" | "false" => return Ok(false),
                _ => println!("Please answer yes or no."),
            },
        }
    }
}
