extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate usrouter;

use clap::{
    App,
    Arg,
    ArgMatches,
};

use usrouter::core::route_table::StaticRoute;
use usrouter::Result;

fn main() {
    env_logger::init();

    let matches = App::new("usrouter")
        .about("Routes IPv4 packets between the network interfaces of the host")
        .arg(
            Arg::with_name("mode")
                .long("mode")
                .value_name("MODE")
                .help("Dump received frames or route them")
                .possible_values(&["dump", "router"])
                .default_value("router")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("route")
                .long("route")
                .value_name("PREFIX/LEN,NEXT_HOP")
                .help("Static route to a remote network, e.g. 192.168.2.0/24,192.168.0.2")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .validator(|route| {
                    route
                        .parse::<StaticRoute>()
                        .map(|_| ())
                        .map_err(|_| format!("Invalid route '{}'.", route))
                }),
        )
        .arg(
            Arg::with_name("ignore")
                .long("ignore")
                .value_name("NAME")
                .help("Interface to leave alone, in addition to lo, bond0, etc.")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1),
        )
        .get_matches();

    if let Err(err) = run(&matches) {
        error!("Exiting with {:?}.", err);
        std::process::exit(1);
    }
}

#[cfg(target_os = "linux")]
fn run(matches: &ArgMatches) -> Result<()> {
    use usrouter::linux::ifaces;

    let ignored: Vec<String> = matches
        .values_of("ignore")
        .map(|names| names.map(String::from).collect())
        .unwrap_or_default();

    let static_routes: Vec<StaticRoute> = matches
        .values_of("route")
        .map(|routes| routes.filter_map(|route| route.parse().ok()).collect())
        .unwrap_or_default();

    let interfaces = ifaces::enumerate(&ignored)?;

    match matches.value_of("mode") {
        Some("dump") => platform::dump(interfaces),
        _ => platform::route(interfaces, &static_routes),
    }
}

#[cfg(not(target_os = "linux"))]
fn run(_: &ArgMatches) -> Result<()> {
    Err(usrouter::Error::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "usrouter is only supported on Linux",
    )))
}

#[cfg(target_os = "linux")]
mod platform {
    use std::os::unix::io::{
        AsRawFd,
        RawFd,
    };
    use std::time::Duration;

    use usrouter::core::dev::Device;
    use usrouter::core::route_table::StaticRoute;
    use usrouter::core::service::{
        ethernet,
        Interface,
        Router,
    };
    use usrouter::linux::dev::RawSocket;
    use usrouter::linux::poll;
    use usrouter::{
        Error,
        Result,
    };

    const POLL_TIMEOUT: Duration = Duration::from_secs(1);

    fn raw_fds(interfaces: &[Interface<RawSocket>]) -> Vec<RawFd> {
        interfaces
            .iter()
            .map(|interface| interface.dev.as_raw_fd())
            .collect()
    }

    /// Prints every received frame in hex.
    pub fn dump(mut interfaces: Vec<Interface<RawSocket>>) -> Result<()> {
        let fds = raw_fds(&interfaces);
        let mut eth_buffer = vec![0; 65536];

        loop {
            for i in poll::wait_readable(&fds, POLL_TIMEOUT)? {
                let interface = &mut interfaces[i];
                loop {
                    let buffer_len = match interface.dev.recv(&mut eth_buffer) {
                        Ok(buffer_len) => buffer_len,
                        Err(Error::Exhausted) => break,
                        Err(err) => return Err(err),
                    };

                    let hex: String = eth_buffer[.. buffer_len]
                        .iter()
                        .map(|byte| format!("{:02x}", byte))
                        .collect();
                    println!(
                        "Received {} bytes from {}: {}",
                        buffer_len, interface.name, hex
                    );
                }
            }
        }
    }

    /// Routes packets between the interfaces until polling fails.
    pub fn route(interfaces: Vec<Interface<RawSocket>>, static_routes: &[StaticRoute]) -> Result<()> {
        let fds = raw_fds(&interfaces);
        let mut router = Router::new(interfaces)?;

        for static_route in static_routes {
            router.route_table.add_static(static_route)?;
            info!(
                "Set route {} via {}.",
                static_route.prefix, static_route.next_hop
            );
        }

        loop {
            let readable = poll::wait_readable(&fds, POLL_TIMEOUT)?;
            ethernet::recv_all(&mut router, &readable);
        }
    }
}
