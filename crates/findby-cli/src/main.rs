//! findby CLI entry point.

mod args;
mod config;
mod server;

use anyhow::Context;
use clap::Parser;
use findby_core::css;
use findby_core::literal;
use findby_core::{Resolver, ResolverOptions};
use tracing::error;

use crate::args::{Cli, Commands, ResolveArgs};
use crate::config::Config;

fn main() {
    // Logs go to stderr; stdout carries results and protocol responses
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = run(cli, config) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Resolve(args) => run_resolve(args, config),
        Commands::Encode(args) => {
            println!("{}", literal::encode(&args.text));
            Ok(())
        }
        Commands::CssToXpath(args) => {
            let xpath = css::to_xpath(&args.selector)
                .with_context(|| format!("Cannot translate '{}'", args.selector))?;
            println!("{}", xpath);
            Ok(())
        }
        Commands::Strategies(args) => {
            let resolver = resolver_for(config, args.no_platform);
            for info in server::strategy_info(&resolver) {
                let note = match (info.platform, info.enabled) {
                    (true, true) => "  (platform)",
                    (true, false) => "  (platform, disabled)",
                    _ => "",
                };
                println!("{}{}", info.name, note);
            }
            Ok(())
        }
        Commands::Serve(args) => {
            let resolver = resolver_for(config, args.no_platform);
            let max_request_size = args.max_request_size.unwrap_or(config.max_request_size);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(async {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                server::serve(resolver, stdin, tokio::io::stdout(), max_request_size).await
            })
        }
        Commands::Examples => {
            println!("{}", args::EXAMPLES_TEXT);
            Ok(())
        }
    }
}

fn run_resolve(args: ResolveArgs, config: Config) -> anyhow::Result<()> {
    let resolver = resolver_for(config, args.no_platform);
    let relative = relative_for(&args, config);

    let resolution = resolver.explain_with(&args.selector, relative, args.using);

    if args.json {
        let json = if args.explain {
            serde_json::to_string_pretty(&resolution)?
        } else {
            serde_json::to_string_pretty(&resolution.descriptor)?
        };
        println!("{}", json);
    } else {
        println!("{}", resolution.descriptor);
        if args.explain {
            println!("rule: {}", resolution.rule);
        }
    }

    Ok(())
}

/// `--relative` and `--absolute` override `FINDBY_RELATIVE`.
fn relative_for(args: &ResolveArgs, config: Config) -> bool {
    if args.absolute {
        false
    } else {
        args.relative || config.relative
    }
}

/// Build a resolver, letting `--no-platform` override the environment.
fn resolver_for(config: Config, no_platform: bool) -> Resolver {
    let options = config.resolver_options();
    Resolver::new(ResolverOptions {
        platform_strategies: options.platform_strategies && !no_platform,
    })
}
