use std::sync::Arc;

use gamedex::backends::http::HttpCatalogBackend;
use gamedex::stats_ledger::DEFAULT_TOP_LIMIT;
use gamedex::{config, Catalog, CatalogCache, CatalogItem, StatsLedger, StatsStore};
use log::info;

fn print_usage() {
    eprintln!("Usage: gamedex <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  list             Print the full catalog");
    eprintln!("  search <query>   Print catalog items matching <query>");
    eprintln!("  play <id>        Record one play of item <id>");
    eprintln!("  top [limit]      Print the most played items");
    eprintln!("  history          Print recently played items");
    eprintln!("  stats            Print the stats record");
    eprintln!("  launch <id>      Print the launch URL for item <id>");
    eprintln!("  reset            Delete all recorded stats");
}

fn print_items(items: &[CatalogItem]) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }
    for item in items {
        println!(
            "#{:02}  {}  [{}]",
            item.number,
            item.name,
            item.category.as_deref().unwrap_or("-")
        );
    }
}

fn parse_id_arg(raw: Option<&String>, command: &str) -> i64 {
    match raw.and_then(|value| value.parse::<i64>().ok()) {
        Some(id) => id,
        None => {
            eprintln!("{command} requires a numeric item id");
            std::process::exit(2);
        }
    }
}

fn main() {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    let args: Vec<String> = std::env::args().collect();
    let command = match args.get(1) {
        Some(command) => command.as_str(),
        None => {
            print_usage();
            std::process::exit(2);
        }
    };

    let app_config = config::load_or_create();
    let cache = Arc::new(CatalogCache::new(Box::new(HttpCatalogBackend::new(
        &app_config.catalog,
    ))));
    let catalog = Catalog::new(cache.clone(), &app_config.catalog.provider_base);
    let store = StatsStore::new().expect("Failed to initialize stats storage");
    let stats = StatsLedger::new(store, cache);

    match command {
        "list" => print_items(&catalog.all()),
        "search" => {
            let query = args.get(2).map(String::as_str).unwrap_or("");
            print_items(&catalog.search(query));
        }
        "play" => {
            let id = parse_id_arg(args.get(2), "play");
            stats.record_play(id);
            let record = stats.read();
            info!(
                "Recorded play for item {id}. xp={} lvl={}",
                record.xp, record.lvl
            );
        }
        "top" => {
            let limit = args
                .get(2)
                .and_then(|raw| raw.parse::<usize>().ok())
                .unwrap_or(DEFAULT_TOP_LIMIT);
            print_items(&stats.top_played(limit));
        }
        "history" => print_items(&stats.history()),
        "stats" => {
            let record = stats.read();
            println!("Level {}  ({} xp)", record.lvl, record.xp);
            println!("Plays recorded: {}", record.counts.values().sum::<u64>());
            println!("Distinct items played: {}", record.counts.len());
        }
        "launch" => {
            let id = parse_id_arg(args.get(2), "launch");
            println!("{}", catalog.launch_url(id));
        }
        "reset" => {
            stats.reset();
            info!("Stats record deleted");
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            std::process::exit(2);
        }
    }
}
