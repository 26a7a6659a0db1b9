use std::env;

// Nothing here is named after the target function.
fn factorial(n: u64) -> u64 {
    (1..=n).product()
}

fn main() {
    println!("{}", factorial(env::args().count() as u64));
}
