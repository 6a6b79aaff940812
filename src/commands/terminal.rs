//! Interactive serial console to the bridge
//!
//! Forwards stdin lines to the link (CRLF-terminated, the firmware's line
//! convention) and prints inbound bytes as they arrive.

use std::io::{self, BufRead, Write as _};
use std::sync::mpsc;
use std::thread;

use ttlprog_piclink::{SerialTransport, TcpTransport, Transport};

use super::{parse_port, Port};

/// Run the terminal command
pub fn run(port: &str, baud: u32) -> Result<(), Box<dyn std::error::Error>> {
    match parse_port(port)? {
        Port::Serial(device) => console(SerialTransport::open(&device, Some(baud))?),
        Port::Tcp(host, tcp_port) => console(TcpTransport::connect(&host, tcp_port)?),
        Port::Dummy => Err("the terminal needs a real bridge; dummy: has no console".into()),
    }
}

fn console<T: Transport>(mut transport: T) -> Result<(), Box<dyn std::error::Error>> {
    // stdin is blocking; read it on its own thread and hand lines over
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    println!("Connected. Type lines to send; Ctrl-D exits.");

    let mut buf = [0u8; 256];
    loop {
        match rx.try_recv() {
            Ok(line) => {
                transport.write(line.as_bytes())?;
                transport.write(b"\r\n")?;
                transport.flush()?;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => break,
        }

        let n = transport.read_nonblock(&mut buf, 50)?;
        if n > 0 {
            io::stdout().write_all(&buf[..n])?;
            io::stdout().flush()?;
        }
    }

    Ok(())
}
