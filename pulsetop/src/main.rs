//! Entry point for the pulsetop TUI. Parses args, resolves the profile and runs the App.

use pulsetop::app::App;
use pulsetop::config::ClientConfig;
use pulsetop::kill::HttpProcessControl;
use pulsetop::profiles::{
    load_profiles, save_profiles, ProfileEntry, ProfileRequest, ProfilesFile, ResolveProfile,
};
use std::env;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "[--tls-ca CERT_PEM|-t CERT_PEM] [--profile NAME|-P NAME] [--save] [--api URL] [--reconnect-ms MS] [--dry-run] [ws://HOST:PORT/ws]";

struct ParsedArgs {
    url: Option<String>,
    tls_ca: Option<String>,
    profile: Option<String>,
    api: Option<String>,
    reconnect_ms: Option<u64>,
    save: bool,
    dry_run: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "pulsetop".into());
    let mut url: Option<String> = None;
    let mut tls_ca: Option<String> = None;
    let mut profile: Option<String> = None;
    let mut api: Option<String> = None;
    let mut reconnect: Option<String> = None;
    let mut save = false; // --save
    let mut dry_run = false; // --dry-run

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(format!("Usage: {prog} {USAGE}"));
            }
            "--tls-ca" | "-t" => {
                tls_ca = it.next();
            }
            "--profile" | "-P" => {
                profile = it.next();
            }
            "--api" => {
                api = it.next();
            }
            "--reconnect-ms" => {
                reconnect = it.next();
            }
            "--save" => {
                save = true;
            }
            "--dry-run" => {
                dry_run = true;
            }
            _ if arg.starts_with("--tls-ca=") => {
                tls_ca = flag_value(&arg).or(tls_ca);
            }
            _ if arg.starts_with("--profile=") => {
                profile = flag_value(&arg).or(profile);
            }
            _ if arg.starts_with("--api=") => {
                api = flag_value(&arg).or(api);
            }
            _ if arg.starts_with("--reconnect-ms=") => {
                reconnect = flag_value(&arg).or(reconnect);
            }
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. Usage: {prog} {USAGE}"));
                }
            }
        }
    }
    let reconnect_ms = match reconnect {
        Some(v) => match v.parse::<u64>() {
            Ok(ms) if ms > 0 => Some(ms),
            _ => {
                return Err(format!(
                    "Invalid --reconnect-ms value {v:?} (expected a positive number). Usage: {prog} {USAGE}"
                ))
            }
        },
        None => None,
    };
    Ok(ParsedArgs {
        url,
        tls_ca,
        profile,
        api,
        reconnect_ms,
        save,
        dry_run,
    })
}

fn flag_value(arg: &str) -> Option<String> {
    arg.split_once('=')
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pulsetop=info"));
    let path = env::var_os("PULSETOP_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("pulsetop.log"));
    // stdout belongs to the TUI
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        Err(_) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reuse the same parsing logic for testability
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    init_logging();
    let _ = rustls::crypto::ring::default_provider().install_default();

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        tls_ca: parsed.tls_ca.clone(),
        api: parsed.api.clone(),
    };
    let resolved = req.resolve(&profiles_file);

    // Determine final connection parameters (and maybe mutated profiles to persist)
    let mut profiles_mut = profiles_file.clone();
    let entry: ProfileEntry = match resolved {
        ResolveProfile::Direct(entry) => {
            // Possibly save if profile specified and --save or new entry
            if let Some(name) = parsed.profile.as_ref() {
                match profiles_mut.profiles.get(name) {
                    None => {
                        // New profile: auto-save immediately
                        profiles_mut.profiles.insert(name.clone(), entry.clone());
                        persist(&profiles_mut);
                    }
                    Some(existing) if *existing != entry => {
                        let overwrite = parsed.save
                            || prompt_yes_no(&format!(
                                "Overwrite existing profile '{name}'? [y/N]: "
                            ));
                        if overwrite {
                            profiles_mut.profiles.insert(name.clone(), entry.clone());
                            persist(&profiles_mut);
                        }
                    }
                    Some(_) => {}
                }
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::PromptSelect(names) => {
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|idx| *idx >= 1 && *idx <= names.len())
                .and_then(|idx| profiles_mut.profiles.get(&names[idx - 1]).cloned());
            match picked {
                Some(entry) => entry,
                None => return Ok(()),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter URL (ws://HOST:PORT/ws or wss://...): ")?;
            if url.trim().is_empty() {
                return Ok(());
            }
            let ca = prompt_string("Enter TLS CA path (or leave blank): ")?;
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                tls_ca: Some(ca.trim().to_string()).filter(|s| !s.is_empty()),
                api: parsed.api.clone(),
            };
            profiles_mut.profiles.insert(name, entry.clone());
            persist(&profiles_mut);
            entry
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            return Ok(());
        }
    };

    // Flags given alongside a loaded profile take precedence for this run.
    let tls_ca = parsed.tls_ca.or(entry.tls_ca);
    let api = parsed.api.or(entry.api);
    let cfg = match ClientConfig::new(
        &entry.url,
        tls_ca.as_deref(),
        api.as_deref(),
        parsed.reconnect_ms,
    ) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return Ok(());
        }
    };

    if parsed.dry_run {
        println!("url: {}", cfg.url);
        println!("api: {}", cfg.api_base);
        if let Some(ca) = cfg.tls_ca.as_ref() {
            println!("tls_ca: {}", ca.display());
        }
        println!("reconnect: {}ms", cfg.reconnect_delay.as_millis());
        return Ok(());
    }

    info!(url = %cfg.url, api = %cfg.api_base, "starting");
    let control = HttpProcessControl::new(&cfg.api_base, cfg.tls_ca.as_deref())?;
    let mut app = App::new(control);
    app.run(&cfg).await
}

fn persist(p: &ProfilesFile) {
    if let Err(e) = save_profiles(p) {
        warn!(error = %e, "failed to save profiles");
        eprintln!("warning: could not save profiles: {e}");
    }
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("pulsetop")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parses_long_short_and_assign_forms() {
        let p = parse_args(args(&[
            "-t",
            "/tmp/ca.pem",
            "--profile=prod",
            "--api",
            "http://h:1",
            "--reconnect-ms=500",
            "--dry-run",
            "ws://h:1/ws",
        ]))
        .unwrap();
        assert_eq!(p.tls_ca.as_deref(), Some("/tmp/ca.pem"));
        assert_eq!(p.profile.as_deref(), Some("prod"));
        assert_eq!(p.api.as_deref(), Some("http://h:1"));
        assert_eq!(p.reconnect_ms, Some(500));
        assert_eq!(p.url.as_deref(), Some("ws://h:1/ws"));
        assert!(p.dry_run && !p.save);
    }

    #[test]
    fn rejects_extra_positional_and_bad_delay() {
        assert!(parse_args(args(&["ws://a/ws", "ws://b/ws"])).is_err());
        assert!(parse_args(args(&["--reconnect-ms", "soon"])).is_err());
        assert!(parse_args(args(&["--reconnect-ms", "0"])).is_err());
        assert!(parse_args(args(&["--reconnect-ms=0"])).is_err());
        let help = parse_args(args(&["--help"])).err().unwrap();
        assert!(help.starts_with("Usage: pulsetop"));
    }
}
