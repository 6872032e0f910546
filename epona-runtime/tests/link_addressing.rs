mod test_helper;

use epona_packets::MacAddr;
use epona_runtime::phy::BroadcastLink;
use std::sync::Arc;
use test_helper::Host;

struct Lan {
    link: Arc<BroadcastLink>,
    a: Host,
    b: Host,
    c: Host,
    d: Host,
}

fn lan() -> Lan {
    let link = BroadcastLink::new("addressing-link");
    let host = |mac: &[u8; 6], ip: &str| Host::new(*mac, ip, "10.1.234.1").plugged(link.clone());
    Lan {
        a: host(b"ePoNa~", "10.1.234.2/23"),
        b: host(b"\xfftest\xfe", "10.1.234.3/23"),
        c: host(b"90\\,t%", "10.1.234.4/23"),
        d: host(b"\x82\x99...\xc9", "10.1.234.5/23"),
        link,
    }
}

#[test]
fn datagram_conveyed_both_ways() {
    let lan = lan();
    lan.a
        .adapter
        .output(0xbe42, lan.b.hwaddr(), b"test-datagram conveyed");
    lan.b
        .adapter
        .output(0x9291, lan.a.hwaddr(), b"test-datagram conveyed TWO");

    assert_eq!(
        lan.a.delivered(),
        vec![(0x9291, b"test-datagram conveyed TWO".to_vec())]
    );
    assert_eq!(
        lan.b.delivered(),
        vec![(0xbe42, b"test-datagram conveyed".to_vec())]
    );
}

#[test]
fn unicast_accepted_only_by_destination() {
    let lan = lan();
    lan.b
        .adapter
        .output(0x1293, lan.c.hwaddr(), b"from b to c with love");
    lan.b
        .adapter
        .output(0x1293, MacAddr::new(*b"NOBODy"), b"howling a\t the wi\nd");
    lan.d
        .adapter
        .output(0xbbb4, lan.b.hwaddr(), b"from d to b with loathing");

    assert!(lan.a.delivered().is_empty());
    assert_eq!(
        lan.b.delivered(),
        vec![(0xbbb4, b"from d to b with loathing".to_vec())]
    );
    assert_eq!(
        lan.c.delivered(),
        vec![(0x1293, b"from b to c with love".to_vec())]
    );
    assert!(lan.d.delivered().is_empty());
}

#[test]
fn broadcast_accepted_by_all_but_sender() {
    let lan = lan();
    let seal = b"hello everybody I'm a baby seal".to_vec();
    lan.b.adapter.output(0xf00f, MacAddr::BROADCAST, &seal);

    assert_eq!(lan.a.delivered(), vec![(0xf00f, seal.clone())]);
    assert!(lan.b.delivered().is_empty());
    assert_eq!(lan.c.delivered(), vec![(0xf00f, seal.clone())]);
    assert_eq!(lan.d.delivered(), vec![(0xf00f, seal)]);
}

#[test]
fn any_protonum() {
    let lan = lan();
    for protonum in (0x00ff..0x8000).step_by(0x00ff) {
        lan.a.adapter.output(protonum, lan.b.hwaddr(), b"yes, it works");
        assert_eq!(
            lan.b.delivered(),
            vec![(protonum, b"yes, it works".to_vec())]
        );
    }
}

#[test]
fn any_payload_byte() {
    let lan = lan();
    let allbytes: Vec<u8> = (0..=255).collect();
    for shift in 0..256 {
        let payload = [&allbytes[shift..], &allbytes[..shift]].concat();
        lan.c.adapter.output(shift as u16, lan.d.hwaddr(), &payload);
        assert_eq!(lan.d.delivered(), vec![(shift as u16, payload)]);
    }
}

#[test]
fn any_mac_byte() {
    let lan = lan();
    let hosts: Vec<Host> = (0x56d6_2a81_ff2bu64..0x8200_0000_0000)
        .step_by(0x00fe_ff00_ff01)
        .enumerate()
        .map(|(n, mac)| {
            let mut bytes = [0; 6];
            bytes.copy_from_slice(&mac.to_be_bytes()[2..]);
            let ip = format!("10.1.235.{}/23", n + 10);
            Host::new(bytes, &ip, "10.1.234.1").plugged(lan.link.clone())
        })
        .collect();

    let payload = |src: &Host, dst: &Host| format!("hi {} this is {}!", dst.hwaddr(), src.hwaddr());
    let n = hosts.len();
    for (i, src) in hosts.iter().enumerate() {
        let dst = &hosts[(i + 3) % n];
        src.adapter
            .output(0x412a, dst.hwaddr(), payload(src, dst).as_bytes());
    }
    for (i, src) in hosts.iter().enumerate() {
        let dst = &hosts[(i + 3) % n];
        assert_eq!(
            dst.delivered(),
            vec![(0x412a, payload(src, dst).into_bytes())]
        );
    }
}

#[test]
fn corrupted_frames_dropped_by_everyone() {
    let lan = lan();
    for trial in 0..100 {
        lan.link.corrupt_next();
        lan.b.adapter.output(
            0xfc00 | trial,
            MacAddr::BROADCAST,
            b"this is a payload that has a number of bytes in it",
        );
    }

    let clean = b"this is a payload that will be transmitted without errors".to_vec();
    lan.c.adapter.output(0xde44, MacAddr::BROADCAST, &clean);

    for trial in 0..100 {
        lan.link.corrupt_next();
        lan.d.adapter.output(
            0xfb00 | trial,
            MacAddr::BROADCAST,
            b"this round 2 still has a number of bytes in it",
        );
    }

    assert_eq!(lan.a.delivered(), vec![(0xde44, clean.clone())]);
    assert_eq!(lan.b.delivered(), vec![(0xde44, clean.clone())]);
    assert!(lan.c.delivered().is_empty());
    assert_eq!(lan.d.delivered(), vec![(0xde44, clean)]);
}
