//! Descriptor Generator CLI
//!
//! Command-line tool for generating tool descriptor files from OpenAPI and
//! Swagger specifications.

use clap::{Arg, Command};
use restbridge::auth::AuthProfile;
use restbridge::spec::{Severity, SpecNormalizer};
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let matches = Command::new("restbridge-generate")
        .about("Generate tool descriptor files from OpenAPI/Swagger specifications")
        .version(restbridge::VERSION)
        .arg(
            Arg::new("spec")
                .short('s')
                .long("spec")
                .value_name("FILE")
                .help("Specification file (JSON or YAML)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output descriptor file")
                .required(true),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Base URL for the API (overrides the specification's own)"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format (yaml, json)")
                .default_value("yaml"),
        )
        .arg(
            Arg::new("auth-type")
                .short('a')
                .long("auth-type")
                .value_name("TYPE")
                .help("Authentication type (none, bearer, api_key, basic, oauth2)")
                .default_value("none"),
        )
        .arg(
            Arg::new("auth-token")
                .short('t')
                .long("auth-token")
                .value_name("TOKEN")
                .help("Token (for bearer/api_key/oauth2 auth)"),
        )
        .arg(
            Arg::new("auth-header")
                .long("auth-header")
                .value_name("HEADER")
                .help("Header name (for api_key auth)")
                .default_value("X-API-Key"),
        )
        .arg(
            Arg::new("auth-username")
                .long("auth-username")
                .value_name("USERNAME")
                .help("Username (for basic auth)"),
        )
        .arg(
            Arg::new("auth-password")
                .long("auth-password")
                .value_name("PASSWORD")
                .help("Password (for basic auth)"),
        )
        .arg(
            Arg::new("methods")
                .short('m')
                .long("methods")
                .value_name("METHODS")
                .help("Comma-separated list of HTTP methods to include (e.g., GET,POST)"),
        )
        .arg(
            Arg::new("include-deprecated")
                .long("include-deprecated")
                .help("Include deprecated operations")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let spec_file = matches.get_one::<String>("spec").ok_or("--spec is required")?;
    let output_file = matches.get_one::<String>("output").ok_or("--output is required")?;
    let format = matches.get_one::<String>("format").map(String::as_str).unwrap_or("yaml");

    let auth_type = matches
        .get_one::<String>("auth-type")
        .map(String::as_str)
        .unwrap_or("none");
    let profile = match auth_type {
        "none" => AuthProfile::none(),
        "bearer" => {
            let token = matches
                .get_one::<String>("auth-token")
                .ok_or("Bearer authentication requires --auth-token")?;
            AuthProfile::bearer(token)
        }
        "api_key" => {
            let token = matches
                .get_one::<String>("auth-token")
                .ok_or("API key authentication requires --auth-token")?;
            let header = matches
                .get_one::<String>("auth-header")
                .map(String::as_str)
                .unwrap_or("X-API-Key");
            AuthProfile::api_key(token.as_str(), header)
        }
        "basic" => {
            let username = matches
                .get_one::<String>("auth-username")
                .ok_or("Basic authentication requires --auth-username")?;
            let password = matches
                .get_one::<String>("auth-password")
                .ok_or("Basic authentication requires --auth-password")?;
            AuthProfile::basic(username, password)
        }
        "oauth2" => {
            let token = matches
                .get_one::<String>("auth-token")
                .ok_or("OAuth2 authentication requires --auth-token")?;
            AuthProfile::oauth2(token)
        }
        other => {
            return Err(format!(
                "Invalid auth type: {}. Use 'none', 'bearer', 'api_key', 'basic', or 'oauth2'",
                other
            )
            .into());
        }
    };

    let spec_content = fs::read_to_string(spec_file)
        .map_err(|e| format!("Failed to read spec file '{}': {}", spec_file, e))?;

    let mut normalizer = SpecNormalizer::new().with_auth_kind(profile.kind);
    if let Some(methods) = matches.get_one::<String>("methods") {
        let method_list: Vec<String> = methods.split(',').map(|m| m.trim().to_string()).collect();
        normalizer = normalizer.with_method_filter(method_list);
    }
    if matches.get_flag("include-deprecated") {
        normalizer = normalizer.include_deprecated();
    }

    println!("Normalizing specification from '{}'...", spec_file);
    let mut normalized = normalizer
        .normalize(&spec_content)
        .map_err(|e| format!("Failed to normalize specification: {}", e))?;

    if let Some(base_url) = matches.get_one::<String>("base-url") {
        normalized.api.base_url = Some(base_url.clone());
    }

    println!(
        "Normalized {} tools from a {} specification",
        normalized.descriptors.len(),
        normalized.dialect.as_str()
    );

    for diagnostic in &normalized.diagnostics {
        let label = match diagnostic.severity {
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        println!("  [{}] {}: {}", label, diagnostic.location, diagnostic.message);
    }

    let set = normalized.into_set();
    let content = match format {
        "yaml" => serde_yaml::to_string(&set)
            .map_err(|e| format!("Failed to serialize to YAML: {}", e))?,
        "json" => serde_json::to_string_pretty(&set)
            .map_err(|e| format!("Failed to serialize to JSON: {}", e))?,
        other => return Err(format!("Invalid format: {}. Use 'yaml' or 'json'", other).into()),
    };

    fs::write(output_file, content)
        .map_err(|e| format!("Failed to write output file '{}': {}", output_file, e))?;

    println!("Descriptor file written to '{}'", output_file);

    println!("\nGenerated tools:");
    for tool in &set.tools {
        println!(
            "  - {} {} {}",
            tool.name,
            tool.method,
            tool.description.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
