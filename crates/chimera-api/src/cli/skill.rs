//! CLI skill subcommands: list, show, check and invoke.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::Value;

use chimera_core::contract::ContractRegistry;
use chimera_infra::contract_store::ContractStore;
use chimera_infra::skills::builtin_handlers;
use chimera_types::Payload;
use chimera_types::contract::FieldKind;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

pub fn list_skills(state: &AppState, json: bool) -> Result<()> {
    let contracts = state.dispatcher.contracts();
    let handlers = state.dispatcher.handlers();

    if json {
        let out: Vec<Value> = contracts
            .contracts()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "version": c.version,
                    "spec_version": c.spec_version,
                    "failure_codes": c.failure_modes.iter().map(|m| m.code.as_str()).collect::<Vec<_>>(),
                    "implemented": handlers.contains(&c.id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if contracts.is_empty() {
        println!();
        println!(
            "  No skill contracts found in {}.",
            style(state.skills_dir.display()).cyan()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Id").fg(Color::Cyan),
            Cell::new("Version"),
            Cell::new("Spec"),
            Cell::new("Failure modes"),
            Cell::new("Handler"),
        ]);

    for c in contracts.contracts() {
        let implemented = handlers.contains(&c.id);
        let codes: Vec<&str> = c.failure_modes.iter().map(|m| m.code.as_str()).collect();
        table.add_row(vec![
            Cell::new(&c.id),
            Cell::new(&c.version),
            Cell::new(&c.spec_version),
            Cell::new(codes.join(", ")),
            if implemented {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("missing").fg(Color::Red)
            },
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Show
// ---------------------------------------------------------------------------

pub fn show_skill(state: &AppState, skill_id: &str, json: bool) -> Result<()> {
    let contracts = state.dispatcher.contracts();
    let document = contracts
        .contract_document(skill_id)
        .with_context(|| format!("Skill '{skill_id}' is not registered"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    let contract = contracts.get_contract(skill_id)?;
    println!();
    println!(
        "  {} {}",
        style(&contract.id).cyan().bold(),
        style(format!("v{}", contract.version)).dim()
    );
    println!("  {}", contract.name);
    println!("  {}", style(&contract.description).dim());
    println!();

    println!("  {}", style("Input").bold());
    for (field, schema) in &contract.input_schema.properties {
        let marker = if contract.input_schema.requires(field) {
            style("*").yellow().to_string()
        } else {
            " ".to_string()
        };
        println!("    {marker} {field}: {}", schema.kind);
    }
    if !contract.input_schema.allows_additional() {
        println!("    {}", style("(no other fields accepted)").dim());
    }
    println!();

    println!("  {}", style("Output").bold());
    for (field, schema) in &contract.output_schema.properties {
        let marker = if contract.output_schema.requires(field) {
            style("*").yellow().to_string()
        } else {
            " ".to_string()
        };
        println!("    {marker} {field}: {}", schema.kind);
    }
    println!();

    println!("  {}", style("Failure modes").bold());
    for mode in &contract.failure_modes {
        let retry = if mode.retryable {
            style("retryable").green()
        } else {
            style("final").red()
        };
        println!("    {} [{retry}] {}", mode.code, style(&mode.description).dim());
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Check
// ---------------------------------------------------------------------------

/// Validate every contract under `skills_dir` without starting the runtime.
///
/// Returns `false` when any contract fails to load.
pub fn check_contracts(skills_dir: &Path, json: bool) -> Result<bool> {
    let store = ContractStore::new(skills_dir);
    let loaded = store
        .read_documents()
        .and_then(ContractRegistry::load);
    let handlers = builtin_handlers();

    match loaded {
        Ok(registry) => {
            let unimplemented: Vec<&str> = registry
                .ids()
                .into_iter()
                .filter(|id| !handlers.contains(id))
                .collect();

            if json {
                let out = serde_json::json!({
                    "skills_dir": skills_dir.display().to_string(),
                    "valid": true,
                    "contracts": registry.ids(),
                    "unimplemented": unimplemented,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!();
                println!(
                    "  {} {} contract(s) valid in {}",
                    style("✓").green(),
                    registry.len(),
                    style(skills_dir.display()).cyan()
                );
                for id in &unimplemented {
                    println!(
                        "  {} {} has no registered handler",
                        style("!").yellow(),
                        style(id).cyan()
                    );
                }
                println!();
            }
            Ok(true)
        }
        Err(e) => {
            if json {
                let out = serde_json::json!({
                    "skills_dir": skills_dir.display().to_string(),
                    "valid": false,
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!();
                println!("  {} {e}", style("✗").red());
                println!();
            }
            Ok(false)
        }
    }
}

// ---------------------------------------------------------------------------
// Invoke
// ---------------------------------------------------------------------------

/// Parse the invocation input from `--input` or `--input-file`.
///
/// With neither flag the input is an empty object.
pub fn read_input(input: Option<&str>, input_file: Option<&PathBuf>) -> Result<Payload> {
    let raw = match (input, input_file) {
        (Some(inline), _) => inline.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => return Ok(Payload::new()),
    };

    let value: Value = serde_json::from_str(&raw).context("Input is not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!(
            "Input must be a JSON object, got {}",
            FieldKind::describe(&other)
        ),
    }
}

/// Invoke a skill and print the outcome.
///
/// Returns `false` when the invocation failed; the error contract has
/// already been printed.
pub async fn invoke_skill(
    state: &AppState,
    skill_id: &str,
    input: &Payload,
    json: bool,
    quiet: bool,
) -> Result<bool> {
    let (result, record) = state.dispatcher.invoke_with_record(skill_id, input).await;

    match result {
        Ok(output) => {
            if !json && !quiet {
                eprintln!(
                    "  {} {} {}",
                    style("✓").green(),
                    style(skill_id).cyan(),
                    style(format!("({} ms, {})", record.duration_ms, record.invocation_id)).dim()
                );
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(output))?);
            Ok(true)
        }
        Err(error) => {
            if !json && !quiet {
                eprintln!(
                    "  {} {} failed at {}: {}",
                    style("✗").red(),
                    style(skill_id).cyan(),
                    record.last_stage,
                    style(&error.error_code).red().bold()
                );
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&Value::Object(error.to_payload()))?
            );
            Ok(false)
        }
    }
}
