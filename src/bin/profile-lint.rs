//! # User Profile Lint
//!
//! A command-line utility for checking user-profile configuration files before
//! they are imported into a realm.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin profile-lint user-profile.json
//! cargo run --bin profile-lint ./profiles/
//! ```
//!
//! ## Output Example
//!
//! ```text
//! Checking user profile: user-profile.json
//! ✓ User profile is valid!
//!
//! Attribute Groups: 2
//!   - user-metadata: header literal "User metadata", no description, 0 attributes
//!   - contact: header ${profile.attribute-group.contact}, no description, 2 attributes
//!   Translation keys: 1
//! ```
//!
//! ## Checks
//!
//! - Must be valid JSON deserializing into a user-profile configuration
//! - Group names cannot be empty and must be unique
//! - Attributes must not reference undefined groups
//!
//! ## Exit Codes
//!
//! - `0`: All files are valid
//! - `1`: One or more files are invalid or could not be read

use realm_profile_admin::profile::{AttributeGroup, DisplayText, UserProfileConfig};
use std::env;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <profile-file-or-directory>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} user-profile.json", args[0]);
        eprintln!("  {} ./profiles/", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);

    if path.is_file() {
        lint_single_file(path);
    } else if path.is_dir() {
        lint_directory(path);
    } else {
        eprintln!(
            "Error: '{}' is not a valid file or directory",
            path.display()
        );
        process::exit(1);
    }
}

fn lint_single_file(file_path: &Path) {
    println!("Checking user profile: {}", file_path.display());

    match load_and_lint(file_path) {
        Ok(config) => {
            println!("✓ User profile is valid!");
            print_summary(&config);
        }
        Err(e) => {
            eprintln!("❌ User profile check failed: {}", e);
            process::exit(1);
        }
    }
}

fn lint_directory(dir_path: &Path) {
    println!("Checking user profiles in directory: {}", dir_path.display());

    let entries = match fs::read_dir(dir_path) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error reading directory: {}", e);
            process::exit(1);
        }
    };

    let mut valid_count = 0;
    let mut error_count = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        println!("\nChecking: {}", path.display());

        match load_and_lint(&path) {
            Ok(config) => {
                println!("  ✓ Valid - {} groups", config.groups.len());
                valid_count += 1;
            }
            Err(e) => {
                eprintln!("  ❌ Invalid - {}", e);
                error_count += 1;
            }
        }
    }

    println!("\nCheck Summary:");
    println!("  Valid profiles: {}", valid_count);
    println!("  Invalid profiles: {}", error_count);

    if error_count > 0 {
        process::exit(1);
    }
}

fn load_and_lint(file_path: &Path) -> Result<UserProfileConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    let config: UserProfileConfig = serde_json::from_str(&content)?;

    for (i, group) in config.groups.iter().enumerate() {
        group
            .validate()
            .map_err(|e| format!("groups[{}]: {}", i, e))?;
    }

    let duplicates = config.duplicate_group_names();
    if !duplicates.is_empty() {
        return Err(format!("Duplicate group names: {}", duplicates.join(", ")).into());
    }

    if let Some((attribute, group)) = config.undefined_group_references().first() {
        return Err(format!(
            "Attribute '{}' references undefined group '{}'",
            attribute, group
        )
        .into());
    }

    Ok(config)
}

fn describe(field: Option<&DisplayText>) -> String {
    match field {
        Some(DisplayText::Literal(text)) => format!("literal \"{}\"", text),
        Some(reference) => reference.to_string(),
        None => "none".to_string(),
    }
}

fn describe_group(config: &UserProfileConfig, group: &AttributeGroup) -> String {
    let description = match group.display_description.as_ref() {
        None => "no description".to_string(),
        field => format!("description {}", describe(field)),
    };
    format!(
        "{}: header {}, {}, {} attributes",
        group.name,
        describe(group.display_header.as_ref()),
        description,
        config.attributes_in_group(&group.name).len()
    )
}

fn print_summary(config: &UserProfileConfig) {
    println!();
    println!("Attribute Groups: {}", config.groups.len());
    for group in &config.groups {
        println!("  - {}", describe_group(config, group));
    }

    let keys: Vec<&str> = config
        .groups
        .iter()
        .flat_map(|group| group.translation_keys())
        .collect();
    println!("  Translation keys: {}", keys.len());
    for key in keys {
        println!("    - {}", key);
    }

    let ungrouped = config
        .attributes
        .iter()
        .filter(|attribute| attribute.get("group").is_none())
        .count();
    if ungrouped > 0 {
        println!("  Attributes without group: {}", ungrouped);
    }
}
