use std::net::IpAddr;
use std::path::PathBuf;

use clap::{crate_name, crate_version};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub fn args() -> ArgMatches {
    build().get_matches()
}

pub fn build() -> Command {
    let serve = Command::new("serve")
        .about("serve pool metrics via HTTP")
        .disable_version_flag(true)
        .arg(arg_pool())
        .arg(arg_zpool())
        .arg(
            Arg::new("address")
                .long("address")
                .value_parser(clap::value_parser!(IpAddr))
                .default_value("0.0.0.0")
                .help("address to listen on")
                .long_help("IP address to listen on.")
                .value_name("ip"),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .value_parser(clap::value_parser!(u16))
                .default_value("8080")
                .help("port to listen on")
                .long_help("TCP port to listen on.")
                .value_name("port"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .action(ArgAction::Set)
                .default_value("metrics")
                .help("HTTP endpoint to export data on")
                .long_help("HTTP path the metrics are served on.")
                .value_name("path"),
        )
        .arg(
            Arg::new("exit-on-error")
                .long("exit-on-error")
                .action(ArgAction::SetTrue)
                .help("exit if a scrape fails")
                .long_help(
"Exit if collecting metrics fails during a scrape. By default, the scrape is \
 answered with 503 Service Unavailable and the exporter keeps running.",
                ),
        )
        .after_long_help(
"Every scrape runs `zpool status`, `zpool list` and `zpool iostat`. The \
 latter samples for one second, so scrapes take at least that long."
        );

    let prometheus = Command::new("prometheus")
        .about("write pool metrics once")
        .alias("prom")
        .disable_version_flag(true)
        .arg(arg_pool())
        .arg(arg_zpool())
        .arg(arg_output())
        .after_long_help(
"Writing to an output file replaces it atomically, which makes this suitable \
 for the node exporter textfile collector."
        );

    Command::new(crate_name!())
        .version(crate_version!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .infer_subcommands(true)
        .subcommand(serve)
        .subcommand(prometheus)
}

// ----------------------------------------------------------------------------
// arguments
// ----------------------------------------------------------------------------

fn arg_output() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_parser(clap::value_parser!(PathBuf))
        .help("output file")
        .long_help("Output file.")
}

fn arg_pool() -> Arg {
    Arg::new("pool")
        .short('p')
        .long("pool")
        .action(ArgAction::Set)
        .default_value("tank")
        .help("pool name")
        .long_help("ZFS pool to monitor.")
        .value_name("pool")
}

fn arg_zpool() -> Arg {
    Arg::new("zpool")
        .long("zpool")
        .value_parser(clap::value_parser!(PathBuf))
        .default_value(zpoxi::zpool::DEFAULT_ZPOOL)
        .help("zpool binary")
        .long_help(
"Path to the `zpool` binary. Looked up in `PATH` if it is not a path."
        )
        .value_name("path")
}

// ----------------------------------------------------------------------------
// tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify() {
        build().debug_assert();
    }

    #[test]
    fn serve_defaults() {
        let args = build().get_matches_from(["zpoxi", "serve"]);
        let (name, args) = args.subcommand().unwrap();

        assert_eq!(name, "serve");
        assert_eq!(args.get_one::<String>("pool").unwrap(), "tank");
        assert_eq!(*args.get_one::<u16>("port").unwrap(), 8080);
        assert_eq!(args.get_one::<String>("endpoint").unwrap(), "metrics");
        assert!(!args.get_flag("exit-on-error"));
    }

    #[test]
    fn prom_alias() {
        let args = build()
            .get_matches_from(["zpoxi", "prom", "-p", "dozer", "-o", "x"]);
        let (name, args) = args.subcommand().unwrap();

        assert_eq!(name, "prometheus");
        assert_eq!(args.get_one::<String>("pool").unwrap(), "dozer");
    }
}
