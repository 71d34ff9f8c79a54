/// Trial division by odd divisors up to `floor(sqrt(n))`.
pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n.is_multiple_of(2) {
        return n == 2;
    }

    let limit = n.isqrt();
    let mut d = 3u64;
    while d <= limit {
        if n.is_multiple_of(d) {
            return false;
        }
        d += 2;
    }

    true
}
