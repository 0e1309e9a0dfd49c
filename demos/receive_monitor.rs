//! Listens on a local port and prints whatever arrives.
//!
//! Pair it with the send_burst demo:
//!   cargo run --example receive_monitor
//!   cargo run --example send_burst

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use easyosc::{OscReceiver, Vec3};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut receiver = OscReceiver::bind("0.0.0.0:9001")?;
    print_banner(&format!("easyosc monitor listening on {}", receiver.local_addr()?))?;

    let gain = Rc::new(RefCell::new(0.0f32));
    receiver
        .add_var("/synth/gain", &gain)
        .add_fn("/synth/note", print_note)
        .add_closure("/synth/position", |p: Vec3| {
            println!("position ({}, {}, {})", p.x, p.y, p.z);
        })
        .add_closure("/synth/label", |label: String| println!("label '{}'", label))
        .set_default_closure(|msg| println!("unhandled {} ({} args)", msg.addr, msg.args.len()));
    receiver.count_incoming(true);

    loop {
        let processed = receiver.poll();
        if processed > 0 {
            println!("{} message(s) this cycle, gain now {}", processed, gain.borrow());
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn print_note(note: i32) {
    println!("note {}", note);
}

fn print_banner(text: &str) -> std::io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_intense(true))?;
    writeln!(&mut stdout, "{}", text)?;
    stdout.reset()
}
