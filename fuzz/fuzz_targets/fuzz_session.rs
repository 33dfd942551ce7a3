#![no_main]

use libfuzzer_sys::fuzz_target;
use tarlet::{MemoryBackend, OpenMode, Session};

fuzz_target!(|data: &[u8]| {
    // Try to open - should never panic
    let mut tar = match Session::from_backend(MemoryBackend::new(data.to_vec()), OpenMode::Read) {
        Ok(t) => t,
        Err(_) => return, // Expected for invalid data
    };

    // Walk the archive - should never panic
    let headers = match tar.entries() {
        Ok(h) => h,
        Err(_) => return,
    };

    // Try to read each entry, capped so huge declared sizes stay cheap
    for header in &headers {
        if tar.find(&header.name).is_err() {
            return;
        }
        let _ = tar.read_data(header.size.min(1 << 20) as usize);
    }

    // Append mode on the same bytes - should never panic
    if let Ok(mut tar) = Session::from_backend(MemoryBackend::new(data.to_vec()), OpenMode::Append) {
        let _ = tar.write_dir_header("fuzz/");
        let _ = tar.finalize();
    }
});
