//! Sends a short burst of test messages to the receive_monitor demo.

use std::thread;
use std::time::Duration;

use easyosc::{OscSender, Vec3};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut sender = OscSender::new("127.0.0.1:9001")?;
    println!("sending to {}", sender.target());

    sender
        .send("/synth/gain", 0.8f32)?
        .send("/synth/note", 64)?
        .send("/synth/position", Vec3::new(0.0, 1.5, -2.0))?
        .send("/synth/label", "warm pad")?
        .send("/synth/unmapped", (1, 2.5f32))?;

    for step in 0..=4 {
        sender.send("/synth/gain", step as f32 / 4.0)?;
        thread::sleep(Duration::from_millis(500));
    }

    println!("done");
    Ok(())
}
