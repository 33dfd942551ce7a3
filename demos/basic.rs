/// Basic example demonstrating archive creation, listing and reading
///
/// Run with: cargo run --example basic
use std::error::Error;
use tarlet::{OpenMode, Session};

const ARCHIVE: &str = "example_basic.tar";

fn main() -> Result<(), Box<dyn Error>> {
    println!("=== tarlet Basic Example ===\n");

    println!("1. Creating archive...");
    create_archive()?;

    println!("\n2. Appending to archive...");
    append_to_archive()?;

    println!("\n3. Reading from archive...");
    read_archive()?;

    println!("\n✓ Example complete!");
    Ok(())
}

fn create_archive() -> Result<(), Box<dyn Error>> {
    let mut tar = Session::open(ARCHIVE, OpenMode::Write)?;

    tar.write_dir_header("docs/")?;

    let readme = b"This is a readme file for the basic example.";
    tar.write_file_header("docs/readme.txt", readme.len() as u64)?;
    tar.write_data(readme)?;

    // Payloads can be written in pieces
    tar.write_file_header("zeros.dat", 1000)?;
    tar.write_data(&[0u8; 600])?;
    tar.write_data(&[0u8; 400])?;

    tar.finalize()?;
    tar.close()?;
    println!("   ✓ Archive created: {}", ARCHIVE);

    Ok(())
}

fn append_to_archive() -> Result<(), Box<dyn Error>> {
    let mut tar = Session::open(ARCHIVE, OpenMode::Append)?;

    let notes = b"# Notes\n\nAdded after the archive was first written.";
    tar.write_file_header("notes.md", notes.len() as u64)?;
    tar.write_data(notes)?;

    tar.finalize()?;
    tar.close()?;
    println!("   ✓ Appended notes.md");

    Ok(())
}

fn read_archive() -> Result<(), Box<dyn Error>> {
    let mut tar = Session::open(ARCHIVE, OpenMode::Read)?;

    println!("   Files in archive:");
    for header in tar.entries()? {
        println!("     - {} ({} bytes, {:?})", header.name, header.size, header.kind);
    }

    println!("\n   Reading notes.md:");
    let header = tar.find("notes.md")?;
    let data = tar.read_data(header.size as usize)?;
    println!("   {}", String::from_utf8_lossy(&data));

    println!("\n   Reading zeros.dat in chunks:");
    let header = tar.find("zeros.dat")?;
    let mut total = 0;
    while total < header.size as usize {
        total += tar.read_data(256)?.len();
    }
    println!("   ✓ Read {} bytes", total);

    tar.close()?;
    Ok(())
}
