use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use game_patcher::config::{load_settings, Settings};
use game_patcher::layout::PATCH_GAME_DIR;
use game_patcher::{
    ClientType, GameInstall, MatchPolicy, OsFileSystem, PatchResult, Patcher, Role, RoleState,
    ScanError, TreeComparison, TreeScan,
};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

const GAME_DIR_ENV: &str = "GAME_PATCHER_GAME_DIR";
const PATCH_DIR_ENV: &str = "GAME_PATCHER_PATCH_DIR";

#[derive(Parser)]
#[command(name = "game-patcher")]
#[command(
    about = "Swap game metadata and user assembly with patched versions",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Game install directory or game executable (auto-detected if not specified)
    #[arg(short, long, global = true)]
    game_dir: Option<PathBuf>,

    /// Directory holding the "Genshin Impact Game" patch tree (default: current directory)
    #[arg(short, long, global = true)]
    patch_dir: Option<PathBuf>,

    /// Client type: chinese or ocean (detected from the game directory if not specified)
    #[arg(short, long, global = true)]
    client: Option<ClientType>,

    /// Settings file (default: ./game-patcher.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Require both patch files to be present
    #[arg(long, global = true)]
    strict: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the client is supported and patch files are present
    Check,

    /// Show whether the game files are patched
    Status {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Back up the game files and replace them with the patch files
    Patch,

    /// Restore the game files from their backups
    Unpatch,

    /// Compare every file in the patch tree with the game directory
    Verify {
        /// Print the comparison as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still wins over the flags
    let default_filter = match (cli.verbose, cli.quiet) {
        (0, true) => "error",
        (0, false) => "warn",
        (1, _) => "info",
        (2, _) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let settings = load_settings(cli.config.as_deref())?;
    let session = build_session(&cli, &settings)?;
    let patcher = &session.patcher;

    let result = match cli.command {
        Commands::Check => cmd_check(patcher),
        Commands::Status { json } => cmd_status(patcher, json)?,
        Commands::Patch => cmd_patch(patcher),
        Commands::Unpatch => cmd_unpatch(patcher),
        Commands::Verify { json } => cmd_verify(&session, json)?,
    };

    let code = result.exit_code();
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}

/// Resolve the game directory.
///
/// Priority order:
/// 1. Explicit --game-dir flag
/// 2. GAME_PATCHER_GAME_DIR environment variable
/// 3. `game_dir` from the settings file
/// 4. Auto-detect by walking up from the current directory
fn resolve_install(cli_game_dir: Option<&Path>, settings: &Settings) -> Result<GameInstall> {
    if let Some(path) = cli_game_dir {
        return detect_at(path);
    }

    if let Ok(env_path) = env::var(GAME_DIR_ENV) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return detect_at(&path);
        }
        eprintln!(
            "{}",
            format!(
                "Warning: {} is set but path doesn't exist: {}",
                GAME_DIR_ENV, env_path
            )
            .yellow()
        );
    }

    if let Some(path) = &settings.game_dir {
        return detect_at(path);
    }

    if let Some(install) = env::current_dir()
        .ok()
        .and_then(|cwd| GameInstall::discover(&cwd))
    {
        println!(
            "{}",
            format!("Auto-detected game directory: {}", install.root.display()).dimmed()
        );
        return Ok(install);
    }

    anyhow::bail!(
        "{}\n{}\n  {}\n  {}\n  {}",
        "Could not find the game directory.".red(),
        "Try one of:".bold(),
        "1. cd into your game directory: cd \"/path/to/Genshin Impact Game\" && game-patcher status",
        "2. Specify explicitly: game-patcher status --game-dir \"/path/to/Genshin Impact Game\"",
        "3. Set environment variable: export GAME_PATCHER_GAME_DIR=\"/path/to/Genshin Impact Game\""
    )
}

/// Accepts either the install directory or the game executable.
fn detect_at(path: &Path) -> Result<GameInstall> {
    let install = if path.is_file() {
        GameInstall::from_executable(path)?
    } else {
        GameInstall::detect(path)?
    };
    Ok(install)
}

fn resolve_patch_dir(cli_patch_dir: Option<&Path>, settings: &Settings) -> PathBuf {
    cli_patch_dir
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(PATCH_DIR_ENV).map(PathBuf::from))
        .or_else(|| settings.patch_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolved install, patch tree and the patcher built from them.
struct Session {
    patcher: Patcher,
    game_root: PathBuf,
    patch_root: PathBuf,
}

fn build_session(cli: &Cli, settings: &Settings) -> Result<Session> {
    let mut install = resolve_install(cli.game_dir.as_deref(), settings)?;

    if let Some(client) = cli.client.or(settings.client) {
        if client != install.client {
            log::info!("client overridden: {} -> {}", install.client, client);
            install = GameInstall::with_client(install.root, client);
        }
    }

    if !install.is_valid() {
        eprintln!(
            "{}",
            format!(
                "Warning: no supported client found in {}",
                install.root.display()
            )
            .yellow()
        );
    }

    let policy = if cli.strict {
        MatchPolicy::Strict
    } else {
        settings.match_policy
    };

    let patch_dir = resolve_patch_dir(cli.patch_dir.as_deref(), settings);
    log::debug!(
        "game dir {}, patch dir {}, client {}, policy {}",
        install.root.display(),
        patch_dir.display(),
        install.client,
        policy
    );

    Ok(Session {
        patcher: Patcher::for_install(&install, &patch_dir).with_policy(policy),
        patch_root: patch_dir.join(PATCH_GAME_DIR),
        game_root: install.root,
    })
}

/// Print one result line and return the result.
fn report(action: &str, result: PatchResult) -> PatchResult {
    if result == PatchResult::Ok {
        println!("{} {}: {}", "✓".green(), action, result);
    } else if result.is_status() {
        println!("{} {}: {}", "⊙".yellow(), action, result);
    } else {
        eprintln!("{} {}: {}", "✗".red(), action, result);
    }
    result
}

fn cmd_check(patcher: &Patcher) -> PatchResult {
    println!("Client: {}", patcher.client());
    let paths = patcher.patch_paths();
    for role in Role::ALL {
        let path = paths.get(role);
        let marker = if path.is_file() {
            "found".green()
        } else {
            "missing".red()
        };
        println!("  {} {} ({})", role, path.display(), marker);
    }
    println!();

    report("Check", patcher.check_patch_files())
}

#[derive(Serialize)]
struct StatusReport {
    client: ClientType,
    policy: MatchPolicy,
    state: PatchResult,
    files: Vec<FileReport>,
}

#[derive(Serialize)]
struct FileReport {
    role: Role,
    live: PathBuf,
    source: PathBuf,
    live_exists: bool,
    source_exists: bool,
    backup_exists: bool,
    live_digest: Option<String>,
    source_digest: Option<String>,
    matched: bool,
}

fn file_report(patcher: &Patcher, state: &RoleState) -> FileReport {
    FileReport {
        role: state.role,
        live: patcher.live_files().get(state.role).to_path_buf(),
        source: patcher.patch_paths().get(state.role).to_path_buf(),
        live_exists: state.live_exists,
        source_exists: state.source_exists,
        backup_exists: state.backup_exists,
        live_digest: state.live_digest.map(|d| d.to_string()),
        source_digest: state.source_digest.map(|d| d.to_string()),
        matched: state.matched,
    }
}

fn cmd_status(patcher: &Patcher, json: bool) -> Result<PatchResult> {
    let (state, roles) = patcher.status();
    let files: Vec<FileReport> = roles.iter().map(|r| file_report(patcher, r)).collect();

    if json {
        let report = StatusReport {
            client: patcher.client(),
            policy: patcher.policy(),
            state,
            files,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(state);
    }

    println!("{}", "Patch Status Report".bold());
    println!("Client: {}", patcher.client());
    println!("Policy: {}", patcher.policy());
    println!();

    for file in &files {
        let marker = if file.matched {
            "✓".green()
        } else {
            "⊙".yellow()
        };
        println!("{} {}", marker, file.role);
        println!("  Live:   {}", file.live.display());
        println!("  Source: {}", file.source.display());
        if let (Some(live), Some(source)) = (&file.live_digest, &file.source_digest) {
            println!("  Digest: {} / {}", live.dimmed(), source.dimmed());
        }
        if file.backup_exists {
            println!("  {}", "Backup present".dimmed());
        }
    }
    println!();

    Ok(report("Status", state))
}

fn cmd_patch(patcher: &Patcher) -> PatchResult {
    report("Patch", patcher.patch())
}

fn cmd_unpatch(patcher: &Patcher) -> PatchResult {
    report("Unpatch", patcher.unpatch())
}

fn compare_tree(session: &Session) -> Result<Option<TreeComparison>, ScanError> {
    let scan = TreeScan::scan(&session.patch_root)?;
    if scan.is_empty() {
        return Ok(None);
    }
    Ok(Some(scan.compare_with(&OsFileSystem, &session.game_root)?))
}

fn cmd_verify(session: &Session, json: bool) -> Result<PatchResult> {
    let comparison = match compare_tree(session) {
        Ok(Some(comparison)) => comparison,
        Ok(None) => return Ok(report("Verify", PatchResult::PatchFileNotFound)),
        Err(err) => {
            log::warn!("verify failed: {err}");
            return Ok(report("Verify", PatchResult::from(&err)));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(comparison.result());
    }

    println!("Patch tree: {}", session.patch_root.display());
    println!("Game dir:   {}", session.game_root.display());
    println!();
    for path in &comparison.matched {
        println!("  {} {}", "✓".green(), path.display());
    }
    for path in &comparison.differing {
        println!("  {} {}", "⊙".yellow(), path.display());
    }
    for path in &comparison.missing {
        println!("  {} {} {}", "✗".red(), path.display(), "(missing)".dimmed());
    }
    println!();

    Ok(report("Verify", comparison.result()))
}
