//! Model listing and wiring guidance

use ttlprog_core::protocol::ProtocolKind;

/// List the supported models of both protocol families
pub fn list_models() {
    for kind in [ProtocolKind::I2c, ProtocolKind::Spi] {
        let protocol = kind.variant();

        println!("{} models:", kind.name());
        println!();
        println!("{:<5} {:<8} {:>10} {:>6}", "Index", "Model", "Size", "Page");
        println!("{}", "-".repeat(32));

        for (index, name) in protocol.model_names().iter().enumerate() {
            let size = protocol.total_size(index).unwrap_or(0);
            println!(
                "{:<5} {:<8} {:>10} {:>6}",
                index,
                name,
                format_size(size),
                protocol.page_size(index)
            );
        }
        println!();
    }
}

/// Print the wiring guidance for a protocol family
pub fn instructions(kind: ProtocolKind) {
    println!("{}", kind.variant().hardware_instructions());
}

fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
