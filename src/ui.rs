// UI layer: terminal prompts and spinners around the API client. The
// command line in `main.rs` calls these helpers directly; running the
// binary without a subcommand drops into `main_menu`.

use crate::api::ApiClient;
use crate::distributions::Distributions;
use crate::package::{PackageRef, PackageSource, Target};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Interactive menu. Loops until the user picks "Exit"; a failed operation
/// is reported and the menu is shown again.
pub fn main_menu(api: &ApiClient) -> Result<()> {
    let items = vec![
        "Push package",
        "Promote package",
        "Delete package",
        "List distributions",
        "Exit",
    ];
    loop {
        let selection = Select::new()
            .with_prompt("What do you want to do?")
            .items(&items)
            .default(0)
            .interact()?;
        let outcome = match selection {
            0 => handle_push(api),
            1 => handle_promote(api),
            2 => handle_delete(api),
            3 => {
                print_distributions(api.distributions());
                Ok(())
            }
            _ => break,
        };
        if let Err(e) = outcome {
            println!("Failed: {:#}", e);
        }
    }
    Ok(())
}

fn prompt_target() -> Result<Target> {
    let raw: String = Input::new()
        .with_prompt("Target (user/repo/distro/version)")
        .interact_text()?;
    Ok(raw.parse()?)
}

fn handle_push(api: &ApiClient) -> Result<()> {
    let target = prompt_target()?;
    let source: String = Input::new()
        .with_prompt("Package file path or URL")
        .interact_text()?;
    push(api, target, &source)
}

fn handle_promote(api: &ApiClient) -> Result<()> {
    let target = prompt_target()?;
    let file: String = Input::new().with_prompt("Package file name").interact_text()?;
    let destination: String = Input::new()
        .with_prompt("Destination repository (user/repo)")
        .interact_text()?;
    promote(api, &target, &PathBuf::from(file), &destination)
}

fn handle_delete(api: &ApiClient) -> Result<()> {
    let target = prompt_target()?;
    let file: String = Input::new().with_prompt("Package file name").interact_text()?;
    delete(api, &target, &PathBuf::from(file), false)
}

/// Upload `source` (path or URL) to `target` behind a spinner.
pub fn push(api: &ApiClient, target: Target, source: &str) -> Result<()> {
    let source = PackageSource::parse(source)?;
    let package = PackageRef::new(target, source);
    let spinner = spinner(&format!("Pushing {} to {}...", package.source, package.target))?;
    let result = api.push_package(&package);
    spinner.finish_and_clear();
    result.with_context(|| format!("push {} to {}", package.source, package.target))?;
    println!("Pushed {} to {}", package.source, package.target);
    Ok(())
}

pub fn promote(api: &ApiClient, target: &Target, file: &Path, destination: &str) -> Result<()> {
    let spinner = spinner(&format!("Promoting {} to {}...", file.display(), destination))?;
    let result = api.promote_package(target, file, destination);
    spinner.finish_and_clear();
    result.with_context(|| format!("promote {} from {}", file.display(), target))?;
    println!("Promoted {} from {} to {}", file.display(), target.repo, destination);
    Ok(())
}

/// Delete a package. Asks first unless `assume_yes` is set.
pub fn delete(api: &ApiClient, target: &Target, file: &Path, assume_yes: bool) -> Result<()> {
    if !assume_yes && !confirm(&format!("Delete {} from {}?", file.display(), target))? {
        println!("Aborted.");
        return Ok(());
    }
    let spinner = spinner(&format!("Deleting {}...", file.display()))?;
    let result = api.delete_package(target, file);
    spinner.finish_and_clear();
    result.with_context(|| format!("delete {} from {}", file.display(), target))?;
    println!("Deleted {} from {}", file.display(), target);
    Ok(())
}

pub fn print_distributions(distributions: &Distributions) {
    for (name, id) in distributions.iter() {
        println!("{:<24} {}", name, id);
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("reading confirmation")
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}
