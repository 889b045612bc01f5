use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use itemsift::api::{FilterInfo, ItemSearch, SearchResult};
use itemsift::catalog::Catalog;
use itemsift::config::{SiftConfig, CONFIG_KEYS};
use itemsift::error::{Result, SiftError};
use itemsift::filters::default_patch_table;
use itemsift::query::Delimiter;
use itemsift::viewer::data_site;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

/// Overrides the platform config directory
const CONFIG_DIR_ENV: &str = "ITEMSIFT_CONFIG_DIR";

const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 7;
const PATCH_WIDTH: usize = 5;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    config: SiftConfig,
    config_dir: PathBuf,
    catalog_path: Option<PathBuf>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Search {
            query,
            only,
            exclude,
            patch,
            race_sex,
            limit,
        } => handle_search(
            &ctx,
            &query,
            &only,
            &exclude,
            &patch,
            race_sex.as_deref(),
            limit,
        ),
        Commands::Filters => handle_filters(&ctx),
        Commands::Patches => handle_patches(),
        Commands::Open { id } => handle_open(&ctx, id),
        Commands::Config { key, value } => handle_config(&mut ctx, key, value),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    builder.format_timestamp(None);
    if verbose {
        builder.filter_module("itemsift", LevelFilter::Debug);
    }
    builder.init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let config_dir = config_dir()?;
    let config = SiftConfig::load(&config_dir).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable config in {}: {}", config_dir.display(), e);
        SiftConfig::default()
    });

    Ok(AppContext {
        config,
        config_dir,
        catalog_path: cli.catalog.clone(),
    })
}

fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "itemsift", "itemsift")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| SiftError::Config("Could not determine config dir".to_string()))
}

fn load_api(ctx: &AppContext) -> Result<ItemSearch> {
    let path = ctx
        .catalog_path
        .as_deref()
        .or(ctx.config.catalog.as_deref())
        .ok_or_else(|| {
            SiftError::Catalog(
                "No catalog given; pass --catalog or run `itemsift config catalog <path>`"
                    .to_string(),
            )
        })?;
    let catalog = Catalog::load(path)?;
    Ok(ItemSearch::new(catalog, &ctx.config))
}

fn handle_search(
    ctx: &AppContext,
    query: &[String],
    only: &[String],
    exclude: &[String],
    patches: &[String],
    race_sex: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    let mut api = load_api(ctx)?;

    for name in only {
        api.only(name)?;
    }
    for name in exclude {
        api.exclude(name)?;
    }
    for patch in patches {
        api.select_patch(patch)?;
    }
    if let Some(label) = race_sex {
        api.select_race_sex(label)?;
    }

    let query = join_query(query, ctx.config.delimiter());
    let result = api.search(&query);
    print_items(&result, limit);
    print_search_footer(&result);
    Ok(())
}

/// Rejoin shell-split words with the configured delimiter.
fn join_query(words: &[String], delimiter: Delimiter) -> String {
    match delimiter {
        Delimiter::Whitespace => words.join(" "),
        Delimiter::Char(c) => words.join(c.to_string().as_str()),
    }
}

fn handle_filters(ctx: &AppContext) -> Result<()> {
    let api = load_api(ctx)?;
    for info in api.filter_info() {
        print_filter(&info);
    }
    Ok(())
}

fn handle_patches() -> Result<()> {
    for entry in default_patch_table().iter().filter(|p| !p.is_sentinel()) {
        if entry.expansion {
            println!(
                "{:>3}  {} {}",
                entry.id.to_string().dimmed(),
                entry.short_name.bold(),
                format!("({}, whole expansion)", entry.name).dimmed()
            );
        } else {
            println!(
                "{:>3}    {}  {}",
                entry.id.to_string().dimmed(),
                entry.short_name.yellow(),
                entry.name
            );
        }
    }
    Ok(())
}

fn handle_open(ctx: &AppContext, id: u32) -> Result<()> {
    let api = load_api(ctx)?;
    let item = api.item(id)?;
    let site = data_site(&ctx.config)?;

    println!("Opening {} on {}", item.name.bold(), site.name().cyan());
    println!("{}", site.item_url(item).dimmed());
    api.open_item(id, &*site)?.wait();
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key.as_deref(), value) {
        (None, _) => {
            for key in CONFIG_KEYS {
                println!("{} = {}", key, ctx.config.get(key)?);
            }
        }
        (Some(key), None) => println!("{} = {}", key, ctx.config.get(key)?),
        (Some(key), Some(value)) => {
            let value = if key == "catalog" {
                absolute(&value)?
            } else {
                value
            };
            ctx.config.set(key, &value)?;
            ctx.config.save(&ctx.config_dir)?;
            let line = format!("{} = {}", key, ctx.config.get(key)?);
            println!("{}", line.green());
        }
    }
    Ok(())
}

/// Resolve a relative catalog path against the working directory so the
/// saved config works from anywhere.
fn absolute(value: &str) -> Result<String> {
    let path = Path::new(value.trim());
    if value.trim().is_empty() || path.is_absolute() {
        return Ok(value.to_string());
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path).display().to_string())
}

fn print_items(result: &SearchResult, limit: Option<usize>) {
    if result.items.is_empty() {
        println!("No items found.");
        return;
    }

    let shown = limit.unwrap_or(result.items.len());
    for item in result.items.iter().take(shown) {
        let id = format!("{:>width$}", item.id, width = ID_WIDTH);
        let patch = format!("{:<width$}", item.patch, width = PATCH_WIDTH);

        let fixed_width = ID_WIDTH + PATCH_WIDTH + item.category.width() + 6;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let name = truncate_to_width(&item.name, available);
        let padding = " ".repeat(available.saturating_sub(name.width()));

        println!(
            "{}  {}{}  {}  {}",
            id.yellow(),
            name,
            padding,
            patch.dimmed(),
            item.category.dimmed()
        );
    }

    let hidden = result.items.len().saturating_sub(shown);
    if hidden > 0 {
        println!("{}", format!("… and {} more", hidden).dimmed());
    }
}

fn print_search_footer(result: &SearchResult) {
    let count = result.items.len();
    let noun = if count == 1 { "item" } else { "items" };
    println!();
    println!("{}", format!("{} {}", count, noun).bold());

    for info in &result.active {
        let source = if info.from_tag { "tag" } else { "set" };
        println!(
            "  {}: {} {}",
            info.name,
            info.summary.green(),
            format!("({})", source).dimmed()
        );
    }
    if result.query.has_terms() {
        println!(
            "  {}",
            format!("terms: {}", result.query.terms.join(", ")).dimmed()
        );
    }
}

fn print_filter(info: &FilterInfo) {
    let summary = if info.is_set {
        info.summary.green()
    } else {
        info.summary.dimmed()
    };
    println!("{}  {}", info.name.bold(), summary);

    if info.tags.is_empty() {
        println!("  {}", "no tags".dimmed());
    } else {
        let line = format!("tags: {}", info.tags.join(", "));
        println!("  {}", truncate_to_width(&line, LINE_WIDTH - 2).dimmed());
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}
