use std::env;

fn fibonacci(n: u64) -> u64 {
    if n <= 1 {
        return n;
    }
    fibonacci(n - 1) + fibonacci(n - 2)
}

fn main() {
    let n = env::args().nth(1).and_then(|a| a.parse().ok()).unwrap_or(10);
    println!("{}", fibonacci(n));
}
