use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use codepad_core::{Opened, Session};
use codepad_project::{project, DirectoryEntry};
use codepad_settings::{default_preferences_path, PreferencesStore, SchemeCatalog, SchemeKind};

#[derive(Parser)]
#[command(
    name = "codepad-cli",
    about = "Headless utilities for the Codepad editor",
    author,
    version
)]
struct Cli {
    /// 指定偏好設定檔；預設使用設定目錄。 / Preferences file (defaults to the configuration directory).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 顯示資料夾在側邊欄中的樹狀結構。 / Print a folder as the sidebar would show it.
    Tree(TreeArgs),
    /// 以編輯器的方式開啟檔案或資料夾並顯示摘要。 / Open a file or folder the way the editor does and describe it.
    Inspect(InspectArgs),
    /// 檢視或匯入/匯出偏好設定。 / Show, import or export preferences.
    #[command(subcommand)]
    Preferences(PreferencesCommand),
    /// 列出內建配色方案。 / List the built-in style schemes.
    #[command(subcommand)]
    Schemes(SchemesCommand),
}

#[derive(Args)]
struct TreeArgs {
    /// 要投影的資料夾。 / Folder to project.
    #[arg(value_name = "PATH")]
    path: PathBuf,
    /// 以 JSON 輸出。 / Emit JSON instead of an indented listing.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct InspectArgs {
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

#[derive(Subcommand)]
enum PreferencesCommand {
    /// 顯示目前偏好設定。 / Print the current preferences as JSON.
    Show,
    /// 匯出目前偏好設定。 / Export current preferences.
    Export(PreferencesExportArgs),
    /// 匯入偏好設定 JSON。 / Import preferences from JSON.
    Import(PreferencesImportArgs),
    /// 設定配色方案。 / Change the style scheme.
    SetScheme(SetSchemeArgs),
}

#[derive(Args)]
struct PreferencesExportArgs {
    /// 輸出檔案路徑。 / Destination file path.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Args)]
struct PreferencesImportArgs {
    /// 輸入檔案路徑。 / Source preferences JSON.
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

#[derive(Args)]
struct SetSchemeArgs {
    /// 配色方案識別子。 / Scheme identifier, see `schemes list`.
    #[arg(value_name = "ID")]
    id: String,
}

#[derive(Subcommand)]
enum SchemesCommand {
    /// 列出可用的配色方案。 / List available schemes.
    List,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli { config, command } = Cli::parse();
    match command {
        Commands::Tree(args) => execute_tree(args),
        Commands::Inspect(args) => execute_inspect(args),
        Commands::Preferences(subcommand) => {
            let prefs_path = resolve_preferences_path(config)?;
            execute_preferences_command(subcommand, &prefs_path)
        }
        Commands::Schemes(SchemesCommand::List) => {
            let prefs_path = resolve_preferences_path(config)?;
            list_schemes(&prefs_path)
        }
    }
}

fn execute_tree(args: TreeArgs) -> Result<()> {
    let root = resolve_input_path(&args.path)?;
    let tree = project(&root).with_context(|| format!("failed to open {}", root.display()))?;
    if args.json {
        let payload = serde_json::to_string_pretty(&tree).context("serialize tree")?;
        println!("{payload}");
        return Ok(());
    }
    println!("{}/", tree.name);
    print_children(&tree);
    let summary = tree.summary();
    println!();
    println!(
        "{} directories, {} files",
        summary.directories, summary.files
    );
    Ok(())
}

fn print_children(tree: &DirectoryEntry) {
    for (entry, depth) in tree.descendants() {
        let indent = "  ".repeat(depth);
        if entry.is_directory {
            println!("{indent}{}/", entry.name);
        } else {
            println!("{indent}{}", entry.name);
        }
    }
}

fn execute_inspect(args: InspectArgs) -> Result<()> {
    let path = resolve_input_path(&args.path)?;
    let mut session = Session::new();
    match session
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?
    {
        Opened::Folder { root, summary } => {
            println!("Folder:      {}", root.display());
            println!("Directories: {}", summary.directories);
            println!("Files:       {}", summary.files);
        }
        Opened::Document(id) => {
            let Some(doc) = session.document(id) else {
                bail!("document {id} vanished after opening");
            };
            println!("Title:    {}", doc.title());
            println!("Path:     {}", doc.tooltip());
            println!(
                "Language: {}",
                doc.language()
                    .map(|hint| hint.display_name)
                    .unwrap_or("Plain Text")
            );
            println!("Lines:    {}", doc.text().lines().count());
            println!("Bytes:    {}", doc.text().len());
        }
    }
    Ok(())
}

fn execute_preferences_command(command: PreferencesCommand, prefs_path: &Path) -> Result<()> {
    match command {
        PreferencesCommand::Show => show_preferences(prefs_path),
        PreferencesCommand::Export(args) => export_preferences(args, prefs_path),
        PreferencesCommand::Import(args) => import_preferences(args, prefs_path),
        PreferencesCommand::SetScheme(args) => set_scheme(args, prefs_path),
    }
}

fn load_store(prefs_path: &Path) -> Result<PreferencesStore> {
    PreferencesStore::load(prefs_path)
        .with_context(|| format!("failed to load preferences from {}", prefs_path.display()))
}

fn show_preferences(prefs_path: &Path) -> Result<()> {
    let store = load_store(prefs_path)?;
    let payload =
        serde_json::to_string_pretty(store.preferences()).context("serialize preferences")?;
    println!("{payload}");
    Ok(())
}

fn export_preferences(args: PreferencesExportArgs, prefs_path: &Path) -> Result<()> {
    let store = load_store(prefs_path)?;
    let output = resolve_input_path(&args.output)?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    store
        .export_to(&output)
        .with_context(|| format!("failed to export preferences to {}", output.display()))?;
    println!("Exported preferences to {}", output.display());
    Ok(())
}

fn import_preferences(args: PreferencesImportArgs, prefs_path: &Path) -> Result<()> {
    let mut store = load_store(prefs_path)?;
    let input = resolve_input_path(&args.input)?;
    if !input.exists() {
        bail!("preferences file '{}' does not exist", input.display());
    }
    store
        .import_from(&input)
        .with_context(|| format!("failed to import preferences from {}", input.display()))?;
    println!("Imported preferences from {}", input.display());
    Ok(())
}

fn set_scheme(args: SetSchemeArgs, prefs_path: &Path) -> Result<()> {
    let catalog = SchemeCatalog::builtin().context("load built-in schemes")?;
    let Some(scheme) = catalog.get(args.id.trim()) else {
        let known = catalog.ids().collect::<Vec<_>>().join(", ");
        bail!("unknown style scheme '{}' (available: {known})", args.id);
    };
    let mut store = load_store(prefs_path)?;
    store
        .set_style_scheme(scheme.id)
        .with_context(|| format!("failed to save preferences to {}", prefs_path.display()))?;
    println!("Style scheme set to {}", scheme.id);
    Ok(())
}

fn list_schemes(prefs_path: &Path) -> Result<()> {
    let catalog = SchemeCatalog::builtin().context("load built-in schemes")?;
    let current = load_store(prefs_path)?.style_scheme().to_string();
    let active = catalog.resolve(&current).id;
    for scheme in catalog.iter() {
        let marker = if scheme.id == active { "*" } else { " " };
        let kind = match scheme.kind {
            SchemeKind::Dark => "dark",
            SchemeKind::Light => "light",
        };
        println!("{marker} {:<16} {:<16} {kind}", scheme.id, scheme.name);
    }
    Ok(())
}

fn resolve_preferences_path(config: Option<PathBuf>) -> Result<PathBuf> {
    match config {
        Some(path) => resolve_input_path(&path),
        None => default_preferences_path()
            .context("no configuration directory; pass --config or set CODEPAD_CONFIG_DIR"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
