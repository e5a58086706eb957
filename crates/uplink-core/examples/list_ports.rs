//! Lists the serial ports in the order the uplink picks them
//!
//! Usage:
//!   cargo run --example list_ports

use uplink_core::protocol::list_ports;

fn main() {
    let ports = list_ports();
    if ports.is_empty() {
        println!("No serial ports found");
        return;
    }

    for (index, port) in ports.iter().enumerate() {
        let usb = match (port.vid, port.pid) {
            (Some(vid), Some(pid)) => format!(" [{:04x}:{:04x}]", vid, pid),
            _ => String::new(),
        };
        println!(
            "{}: {}{} {}",
            index,
            port.name,
            usb,
            port.manufacturer.as_deref().unwrap_or("")
        );
    }
}
