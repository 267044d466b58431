//! List audio devices with the standard catalog and 16-bit probes

use devprobe_audio::{CpalSubsystem, Reporter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut subsystem = CpalSubsystem::new();
    let stdout = std::io::stdout();

    let summary = Reporter::default().run(&mut subsystem, &mut stdout.lock())?;
    eprintln!("{} devices listed", summary.device_count);
    Ok(())
}
