use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};
use treedit::cli::args::Cli;
use treedit::cli::commands::execute_command;
use treedit::cli::output;

/// Dependency targets whose debug output drowns the editor's own spans.
const QUIET_TARGETS: &[&str] = &["config"];

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

/// `-d` count to level; anything past `-ddd` stays at trace.
fn level_filter(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Logs go to stderr so `nest` and `flatten` keep stdout clean for JSON.
/// `RUST_LOG` wins over `-d` when set.
fn setup_logging(verbosity: u8) {
    let level = level_filter(verbosity);
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let quiet = filter_fn(|metadata| {
        !QUIET_TARGETS
            .iter()
            .any(|target| metadata.target().starts_with(target))
    });

    let spans = if level >= LevelFilter::DEBUG {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(spans)
        .with_filter(env_filter)
        .with_filter(quiet);

    tracing_subscriber::registry().with(fmt_layer).init();
    tracing::debug!(%level, "logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;
    use treedit::util::testing;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        testing::init_test_setup();
        Cli::command().debug_assert();
    }

    #[test]
    fn given_debug_counts_when_mapped_then_levels_rise_and_saturate() {
        assert_eq!(level_filter(0), LevelFilter::WARN);
        assert_eq!(level_filter(1), LevelFilter::INFO);
        assert_eq!(level_filter(2), LevelFilter::DEBUG);
        assert_eq!(level_filter(3), LevelFilter::TRACE);
        assert_eq!(level_filter(9), LevelFilter::TRACE);
    }
}
