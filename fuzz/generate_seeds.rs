//! Generate seed corpus for fuzzing

use std::fs;
use tarlet::{OpenMode, Session};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let corpus_dir = "fuzz/corpus/fuzz_session";
    fs::create_dir_all(corpus_dir)?;

    println!("Generating seed corpus...");

    // Seed 1: Single small file
    {
        let path = format!("{}/seed_single_small.tar", corpus_dir);
        let mut tar = Session::open(&path, OpenMode::Write)?;
        tar.write_file_header("test.txt", 13)?;
        tar.write_data(b"Hello, World!")?;
        tar.finalize()?;
        tar.close()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 2: Directories and files
    {
        let path = format!("{}/seed_multi.tar", corpus_dir);
        let mut tar = Session::open(&path, OpenMode::Write)?;
        tar.write_dir_header("dir/")?;
        tar.write_file_header("dir/file1.txt", 10)?;
        tar.write_data(b"First file")?;
        tar.write_file_header("dir/file2.txt", 0)?;
        tar.finalize()?;
        tar.close()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 3: Payload spanning several records
    {
        let path = format!("{}/seed_multi_record.tar", corpus_dir);
        let mut tar = Session::open(&path, OpenMode::Write)?;
        let data: Vec<u8> = (0..2000u32).map(|i| (i % 256) as u8).collect();
        tar.write_file_header("blob.bin", data.len() as u64)?;
        tar.write_data(&data)?;
        tar.finalize()?;
        tar.close()?;
        println!("✓ Generated: {}", path);
    }

    // Seed 4: Unterminated archive
    {
        let path = format!("{}/seed_unterminated.tar", corpus_dir);
        let mut tar = Session::open(&path, OpenMode::Write)?;
        tar.write_file_header("partial.txt", 7)?;
        tar.write_data(b"partial")?;
        tar.close()?;
        println!("✓ Generated: {}", path);
    }

    println!("\n✅ Seed corpus generated in {}", corpus_dir);
    Ok(())
}
