mod lan;
mod subscriber;

use crate::lan::Lan;
use crate::subscriber::LanSubscriber;
use cidr::Ipv4Cidr;
use clap::{App, Arg};
use epona_runtime::adapter::Adapter;
use std::net::Ipv4Addr;
use std::process;
use tracing::Level;

fn fail(message: String) -> ! {
    eprintln!("epona-lan: {}", message);
    process::exit(2)
}

fn send(from: &Adapter, to: Ipv4Addr, corrupt: Option<&Lan>) {
    let next_hop = from.config().next_hop(to);
    if let Some(lan) = corrupt {
        if from.cached(next_hop).is_none() {
            lan.uplink().corrupt_next();
        }
    }

    let greeting = format!("hello {} from {}", to, from.config().ip());
    match from.output_ip(0x0800, to, greeting.as_bytes()) {
        Ok(()) => match from.cached(next_hop) {
            Some(mac) if next_hop == to => println!("{} -> {}: sent to {}", from.config().ip(), to, mac),
            Some(mac) => println!(
                "{} -> {}: sent to {} via gateway {}",
                from.config().ip(),
                to,
                mac,
                next_hop
            ),
            None => println!("{} -> {}: sent", from.config().ip(), to),
        },
        Err(err) => println!("{} -> {}: {}", from.config().ip(), to, err),
    }
}

fn main() {
    // Collect arguments from user
    let matches = App::new("EPONA LAN")
        .version("0.1")
        .author("EPONA Contributors")
        .about("Build a simulated switched LAN and have host 0 reach everyone on it")
        .arg(Arg::with_name("hosts")
             .short("n")
             .long("hosts")
             .value_name("COUNT")
             .help("Number of hosts, not counting the gateway")
             .takes_value(true)
             .default_value("4"))
        .arg(Arg::with_name("subnet")
             .short("s")
             .long("subnet")
             .value_name("CIDR")
             .help("Subnet hosts are numbered from; the gateway takes its last usable address")
             .takes_value(true)
             .default_value("10.0.0.0/24"))
        .arg(Arg::with_name("corrupt")
             .short("c")
             .long("corrupt")
             .help("Corrupt the first frame host 0 sends for every resolution"))
        .arg(Arg::with_name("unknown")
             .short("u")
             .long("unknown")
             .help("Also send to a subnet address nobody owns"))
        .arg(Arg::with_name("repeater")
             .short("r")
             .long("repeater")
             .help("Connect host 0 to the switch through a repeater"))
        .arg(Arg::with_name("verbose")
             .short("v")
             .long("verbose")
             .multiple(true)
             .help("Log more; repeat for more detail"))
        .get_matches();

    let level = match matches.occurrences_of("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = LanSubscriber::new(level);
    tracing::subscriber::set_global_default(subscriber).expect("setting tracing default failed");

    let nhosts: u16 = match matches.value_of("hosts").unwrap_or("4").parse() {
        Ok(n) if n > 0 => n,
        _ => fail("--hosts takes a number between 1 and 65535".to_string()),
    };
    let subnet: Ipv4Cidr = match matches.value_of("subnet").unwrap_or("10.0.0.0/24").parse() {
        Ok(subnet) => subnet,
        Err(err) => fail(format!("bad --subnet: {}", err)),
    };

    let lan = match Lan::build(subnet, nhosts, matches.is_present("repeater")) {
        Ok(lan) => lan,
        Err(err) => fail(err),
    };
    let corrupt = if matches.is_present("corrupt") {
        Some(&lan)
    } else {
        None
    };

    let host0 = &lan.hosts[0];
    for host in &lan.hosts[1..] {
        send(host0, host.config().ip(), corrupt);
    }

    let off_subnet = [Ipv4Addr::new(192, 0, 2, 1), Ipv4Addr::new(198, 51, 100, 1)]
        .iter()
        .copied()
        .find(|addr| !subnet.contains(addr))
        .unwrap_or(Ipv4Addr::new(203, 0, 113, 1));
    send(host0, off_subnet, corrupt);

    if matches.is_present("unknown") {
        send(host0, lan.unused_address(), corrupt);
    }

    println!("switch ports learned:");
    for (n, host) in lan.hosts.iter().enumerate() {
        match lan.switch.lookup(host.hwaddr()) {
            Some(port) => println!("  host{} ({}) on port {}", n, host.hwaddr(), port),
            None => println!("  host{} ({}) never heard from", n, host.hwaddr()),
        }
    }
    if let Some(port) = lan.switch.lookup(lan.gateway.hwaddr()) {
        println!("  gateway ({}) on port {}", lan.gateway.hwaddr(), port);
    }
}
