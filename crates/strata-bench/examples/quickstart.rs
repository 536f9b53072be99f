//! Thread-scoped arena walkthrough.
//!
//! Demonstrates: allocate → write → resize → read → free, then shows how
//! failures surface through the last-error slot.

use strata_arena::local;

fn main() {
    println!("=== strata quickstart ===\n");

    let Some(data) = local::allocate(32) else {
        eprintln!("allocate failed: {:?}", local::last_error_message());
        return;
    };
    local::with_arena(|arena| arena.write_bytes(data, b"hello, arena")).unwrap();
    println!("allocated {data}");

    let Some(data) = local::resize(Some(data), 64) else {
        eprintln!("resize failed: {:?}", local::last_error_message());
        return;
    };
    let text = local::with_arena(|arena| {
        let mut buf = [0u8; 12];
        arena.read_bytes(data, &mut buf).map(|()| buf)
    })
    .unwrap();
    println!(
        "resized to {data}, payload starts with {:?}",
        String::from_utf8_lossy(&text)
    );

    local::free(Some(data));
    local::with_arena(|arena| println!("after free: {:?}", arena.stats()));

    // Failures: the operation reports nothing, the slot says why.
    local::free(Some(data));
    println!("double free: {}", local::last_error_message().unwrap_or_default());

    if local::allocate(usize::MAX).is_none() {
        println!("huge allocate: {}", local::last_error_message().unwrap_or_default());
    }
}
