pub mod builder;

mod fill;

use clap::{Parser, Subcommand, ValueEnum};
use form_def::{
    Field, FieldModel, FileStore, FormGateway, KvStore, Mode, Renderer, StoreError, dispatch,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Local drag-and-drop style form builder",
    long_about = "Builds form definitions interactively, publishes them into a local store, and fills published forms from their shareable links"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ViewMode {
    Builder,
    Fill,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportFormat {
    Json,
    Cbor,
}

#[derive(Subcommand)]
enum Command {
    /// Open a link the way the page bootstrap would: a resolvable
    /// `?form=<id>` enters fill mode, anything else enters the builder.
    Open {
        /// Full link or bare query string.
        url: String,
        /// Directory backing the form store.
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
        /// Origin+path used when generating shareable links.
        #[arg(long, value_name = "URL")]
        base: Option<String>,
    },
    /// Interactive builder session over an empty model.
    Build {
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
        #[arg(long, value_name = "URL")]
        base: Option<String>,
    },
    /// Publish a field sequence from a JSON file without prompting.
    Publish {
        /// JSON array of fields.
        #[arg(long, value_name = "FIELDS")]
        fields: PathBuf,
        /// Form name stored with the definition.
        #[arg(long)]
        name: String,
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
        #[arg(long, value_name = "URL")]
        base: Option<String>,
    },
    /// Print the builder or fill markup.
    Render {
        /// Published form id (fill mode).
        #[arg(long, value_name = "ID")]
        form: Option<String>,
        /// JSON array of fields (builder mode).
        #[arg(long, value_name = "FIELDS")]
        fields: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ViewMode::Builder)]
        mode: ViewMode,
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },
    /// Record one response from a JSON answers file.
    Submit {
        #[arg(long, value_name = "ID")]
        form: String,
        /// JSON object of `field_<id>` keys to submitted values.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },
    /// List the responses stored for a published form.
    Responses {
        #[arg(long, value_name = "ID")]
        form: String,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        #[arg(long, value_name = "DIR")]
        store: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Open { url, store, base } => run_open(url, store, base),
        Command::Build { store, base } => run_build(store, base),
        Command::Publish {
            fields,
            name,
            store,
            base,
        } => run_publish(fields, name, store, base),
        Command::Render {
            form,
            fields,
            mode,
            store,
        } => run_render(form, fields, mode, store),
        Command::Submit {
            form,
            answers,
            store,
        } => run_submit(form, answers, store),
        Command::Responses {
            form,
            format,
            store,
        } => run_responses(form, format, store),
    }
}

fn resolve_store_dir(store: Option<PathBuf>) -> PathBuf {
    store
        .or_else(|| env::var_os("FORMLET_STORE_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".formlet-store"))
}

fn resolve_base(base: Option<String>) -> String {
    base.or_else(|| env::var("FORMLET_BASE_URL").ok())
        .unwrap_or_else(|| "file://formlet".to_string())
}

fn open_gateway(store: Option<PathBuf>) -> CliResult<FormGateway<FileStore>> {
    let store = FileStore::open(resolve_store_dir(store))?;
    Ok(FormGateway::new(store))
}

fn run_open(url: String, store: Option<PathBuf>, base: Option<String>) -> CliResult<()> {
    match dispatch(&url) {
        Mode::Fill { form_id } => {
            let mut gateway = open_gateway(store)?;
            match gateway.resolve(&form_id) {
                Ok(_) => fill::run_fill_session(&mut gateway, &form_id),
                Err(StoreError::NotFound(_)) => {
                    // A dead link degrades to a message, not to the builder.
                    println!("Form not found.");
                    Ok(())
                }
                Err(err) => Err(err.into()),
            }
        }
        Mode::Builder => run_build(store, base),
    }
}

fn run_build(store: Option<PathBuf>, base: Option<String>) -> CliResult<()> {
    let mut gateway = open_gateway(store)?;
    let base = resolve_base(base);
    builder::run_builder_session(&mut gateway, &base)
}

fn run_publish(
    fields_path: PathBuf,
    name: String,
    store: Option<PathBuf>,
    base: Option<String>,
) -> CliResult<()> {
    let contents = fs::read_to_string(&fields_path)?;
    let fields: Vec<Field> = serde_json::from_str(&contents)?;
    let mut gateway = open_gateway(store)?;
    let published = gateway.publish(&name, &fields, &resolve_base(base))?;
    println!("Published: {}", published.form_id);
    println!("Share this link: {}", published.link);
    Ok(())
}

fn run_render(
    form: Option<String>,
    fields: Option<PathBuf>,
    mode: ViewMode,
    store: Option<PathBuf>,
) -> CliResult<()> {
    let renderer = Renderer::new()?;
    let html = match (mode, form, fields) {
        (ViewMode::Builder, None, Some(path)) => {
            let fields: Vec<Field> = serde_json::from_str(&fs::read_to_string(path)?)?;
            let model = FieldModel::from_fields(fields);
            renderer.render_builder(model.fields())?
        }
        (ViewMode::Builder, None, None) => renderer.render_builder(&[])?,
        (ViewMode::Fill, Some(form_id), _) => {
            let gateway = open_gateway(store)?;
            let definition = gateway.resolve(&form_id)?;
            renderer.render_fill(&definition)?
        }
        (ViewMode::Fill, None, _) => {
            return Err("fill mode needs --form <ID>".into());
        }
        (ViewMode::Builder, Some(_), _) => {
            return Err("builder mode renders from --fields, not --form".into());
        }
    };
    println!("{html}");
    Ok(())
}

fn run_submit(form_id: String, answers_path: PathBuf, store: Option<PathBuf>) -> CliResult<()> {
    let contents = fs::read_to_string(&answers_path)?;
    let values: BTreeMap<String, String> = serde_json::from_str(&contents)?;
    let mut gateway = open_gateway(store)?;
    let count = submit_values(&mut gateway, &form_id, values)?;
    println!("Response recorded ({count} total).");
    Ok(())
}

/// Route a submission through the component facade, carrying the form's
/// stored record as a one-key storage blob and writing the updated blob
/// back, the way an embedding host would.
fn submit_values(
    gateway: &mut FormGateway<FileStore>,
    form_id: &str,
    values: BTreeMap<String, String>,
) -> CliResult<usize> {
    let raw = gateway
        .store()
        .get(form_id)?
        .ok_or_else(|| format!("no form stored under '{form_id}'"))?;
    let storage = serde_json::json!({ form_id: raw }).to_string();
    let values_json = serde_json::to_string(&values)?;

    let response = component_form::submit_response(form_id, &values_json, &storage);
    let parsed: Value = serde_json::from_str(&response)?;
    if let Some(error) = parsed.get("error").and_then(Value::as_str) {
        return Err(error.to_string().into());
    }
    if parsed["status"] == "error" {
        let mut message = String::from("submission rejected");
        if let Some(missing) = parsed["validation"]["missing_required"].as_array()
            && !missing.is_empty()
        {
            let keys: Vec<&str> = missing.iter().filter_map(Value::as_str).collect();
            let _ = write!(message, "; missing required: {}", keys.join(", "));
        }
        if let Some(errors) = parsed["validation"]["errors"].as_array() {
            for error in errors {
                if let Some(text) = error["message"].as_str() {
                    let _ = write!(message, "; {text}");
                }
            }
        }
        return Err(message.into());
    }

    let updated = parsed["storage"][form_id]
        .as_str()
        .ok_or("facade returned no updated record")?;
    gateway.store_mut().put(form_id, updated)?;
    Ok(parsed["response_count"].as_u64().unwrap_or(0) as usize)
}

fn run_responses(form_id: String, format: ExportFormat, store: Option<PathBuf>) -> CliResult<()> {
    let gateway = open_gateway(store)?;
    let definition = gateway.resolve(&form_id)?;
    match format {
        ExportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&definition.responses)?);
        }
        ExportFormat::Cbor => {
            for response in &definition.responses {
                println!("{}", encode_hex(&response.to_cbor()?));
            }
        }
    }
    Ok(())
}

fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut encoded, "{:02x}", byte);
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use std::path::Path;

    const CONTACT_FIELDS: &str = r#"[
        { "id": "heading-1", "type": "heading", "label": "Contact" },
        { "id": "name-2", "type": "name", "label": "Full Name", "required": true },
        { "id": "email-3", "type": "email", "label": "Email Address" },
        { "id": "radio-4", "type": "radio", "label": "Preferred Contact" }
    ]"#;

    fn write_fields(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("fields.json");
        fs::write(&path, contents).expect("write fields file");
        path
    }

    fn publish_contact_form(
        workspace: &assert_fs::TempDir,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let fields = write_fields(workspace.path(), CONTACT_FIELDS);
        let output = Command::cargo_bin("formlet")?
            .arg("publish")
            .arg("--fields")
            .arg(&fields)
            .arg("--name")
            .arg("Contact")
            .arg("--store")
            .arg(workspace.path().join("store"))
            .arg("--base")
            .arg("https://forms.example.test/app")
            .output()?;
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        let form_id = stdout
            .lines()
            .find_map(|line| line.strip_prefix("Published: "))
            .expect("publish output names the form id")
            .to_string();
        Ok(form_id)
    }

    #[test]
    fn publish_prints_a_shareable_link() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = assert_fs::TempDir::new()?;
        let fields = write_fields(workspace.path(), CONTACT_FIELDS);

        let output = Command::cargo_bin("formlet")?
            .arg("publish")
            .arg("--fields")
            .arg(&fields)
            .arg("--name")
            .arg("Contact")
            .arg("--store")
            .arg(workspace.path().join("store"))
            .arg("--base")
            .arg("https://forms.example.test/app")
            .output()?;
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        assert!(
            stdout.contains("Share this link: https://forms.example.test/app?form=form-"),
            "unexpected publish output: {stdout}"
        );
        Ok(())
    }

    #[test]
    fn publish_rejects_an_empty_field_list() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = assert_fs::TempDir::new()?;
        let fields = write_fields(workspace.path(), "[]");

        let output = Command::cargo_bin("formlet")?
            .arg("publish")
            .arg("--fields")
            .arg(&fields)
            .arg("--name")
            .arg("Contact")
            .arg("--store")
            .arg(workspace.path().join("store"))
            .output()?;
        assert!(!output.status.success());
        let stderr = String::from_utf8(output.stderr)?;
        assert!(stderr.contains("EmptyForm"), "unexpected stderr: {stderr}");

        assert!(
            !workspace.path().join("store").exists()
                || fs::read_dir(workspace.path().join("store"))?.next().is_none()
        );
        Ok(())
    }

    #[test]
    fn open_reports_unresolvable_links() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = assert_fs::TempDir::new()?;

        let output = Command::cargo_bin("formlet")?
            .arg("open")
            .arg("https://forms.example.test/app?form=form-0000000000000")
            .arg("--store")
            .arg(workspace.path().join("store"))
            .output()?;
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        assert!(stdout.contains("Form not found."), "unexpected output: {stdout}");
        Ok(())
    }

    #[test]
    fn open_surfaces_corrupt_records_instead_of_not_found() -> Result<(), Box<dyn std::error::Error>>
    {
        let workspace = assert_fs::TempDir::new()?;
        let store_dir = workspace.path().join("store");
        fs::create_dir_all(&store_dir)?;
        fs::write(store_dir.join("form-bad.json"), "not a form record")?;

        let output = Command::cargo_bin("formlet")?
            .arg("open")
            .arg("https://forms.example.test/app?form=form-bad")
            .arg("--store")
            .arg(&store_dir)
            .output()?;
        assert!(!output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        assert!(!stdout.contains("Form not found."), "masked as a dead link: {stdout}");
        let stderr = String::from_utf8(output.stderr)?;
        assert!(stderr.contains("form-bad"), "unexpected stderr: {stderr}");
        Ok(())
    }

    #[test]
    fn submit_then_responses_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = assert_fs::TempDir::new()?;
        let form_id = publish_contact_form(&workspace)?;
        let answers = workspace.path().join("answers.json");
        fs::write(
            &answers,
            r#"{ "field_name-2": "Jane Doe", "field_email-3": "jane@example.test" }"#,
        )?;

        let output = Command::cargo_bin("formlet")?
            .arg("submit")
            .arg("--form")
            .arg(&form_id)
            .arg("--answers")
            .arg(&answers)
            .arg("--store")
            .arg(workspace.path().join("store"))
            .output()?;
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        assert!(
            stdout.contains("Response recorded (1 total)."),
            "unexpected submit output: {stdout}"
        );

        let output = Command::cargo_bin("formlet")?
            .arg("responses")
            .arg("--form")
            .arg(&form_id)
            .arg("--store")
            .arg(workspace.path().join("store"))
            .output()?;
        assert!(output.status.success());
        let responses: Value = serde_json::from_slice(&output.stdout)?;
        assert_eq!(responses[0]["field_name-2"], "Jane Doe");
        assert!(responses[0]["timestamp"].is_string());
        assert!(responses[0]["submittedAt"].is_string());
        Ok(())
    }

    #[test]
    fn submit_surfaces_missing_required_keys() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = assert_fs::TempDir::new()?;
        let form_id = publish_contact_form(&workspace)?;
        let answers = workspace.path().join("answers.json");
        fs::write(&answers, r#"{ "field_email-3": "jane@example.test" }"#)?;

        let output = Command::cargo_bin("formlet")?
            .arg("submit")
            .arg("--form")
            .arg(&form_id)
            .arg("--answers")
            .arg(&answers)
            .arg("--store")
            .arg(workspace.path().join("store"))
            .output()?;
        assert!(!output.status.success());
        let stderr = String::from_utf8(output.stderr)?;
        assert!(stderr.contains("field_name-2"), "unexpected stderr: {stderr}");
        Ok(())
    }

    #[test]
    fn responses_export_as_cbor_hex() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = assert_fs::TempDir::new()?;
        let form_id = publish_contact_form(&workspace)?;
        let answers = workspace.path().join("answers.json");
        fs::write(&answers, r#"{ "field_name-2": "Jane Doe" }"#)?;
        Command::cargo_bin("formlet")?
            .arg("submit")
            .arg("--form")
            .arg(&form_id)
            .arg("--answers")
            .arg(&answers)
            .arg("--store")
            .arg(workspace.path().join("store"))
            .assert()
            .success();

        let output = Command::cargo_bin("formlet")?
            .arg("responses")
            .arg("--form")
            .arg(&form_id)
            .arg("--format")
            .arg("cbor")
            .arg("--store")
            .arg(workspace.path().join("store"))
            .output()?;
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout)?;
        let line = stdout.lines().next().expect("one encoded response");
        assert!(!line.is_empty());
        assert!(line.chars().all(|c| c.is_ascii_hexdigit()));
        Ok(())
    }

    #[test]
    fn render_fill_names_the_inputs() -> Result<(), Box<dyn std::error::Error>> {
        let workspace = assert_fs::TempDir::new()?;
        let form_id = publish_contact_form(&workspace)?;

        let output = Command::cargo_bin("formlet")?
            .arg("render")
            .arg("--mode")
            .arg("fill")
            .arg("--form")
            .arg(&form_id)
            .arg("--store")
            .arg(workspace.path().join("store"))
            .output()?;
        assert!(output.status.success());
        let html = String::from_utf8(output.stdout)?;
        assert!(html.contains("name=\"field_name-2\""), "markup: {html}");
        assert!(html.contains("class=\"submit-btn\""), "markup: {html}");
        Ok(())
    }

    #[test]
    fn render_builder_defaults_to_the_empty_canvas() -> Result<(), Box<dyn std::error::Error>> {
        let output = Command::cargo_bin("formlet")?.arg("render").output()?;
        assert!(output.status.success());
        let html = String::from_utf8(output.stdout)?;
        assert!(
            html.contains("Drag and drop fields here to start building your form"),
            "markup: {html}"
        );
        Ok(())
    }
}
