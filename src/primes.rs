use crate::error::PredicateError;

/// Black-box primality test consumed by the filler.
///
/// Implementations must be pure: the same `n` always yields the same answer.
/// Errors are surfaced to the caller as `UlamError::PredicateFailure`.
pub trait PrimePredicate {
    fn check(&self, n: u64) -> Result<bool, PredicateError>;
}

impl<F> PrimePredicate for F
where
    F: Fn(u64) -> bool,
{
    #[inline]
    fn check(&self, n: u64) -> Result<bool, PredicateError> {
        Ok(self(n))
    }
}

/// Trial division over candidates of the form 6k ± 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrialDivision;

impl PrimePredicate for TrialDivision {
    #[inline]
    fn check(&self, n: u64) -> Result<bool, PredicateError> {
        Ok(is_prime(n))
    }
}

pub fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Largest `max` a [`Sieve`] will allocate a table for.
pub const SIEVE_CAP: u64 = 1 << 30;

/// Sieve of Eratosthenes over `0..=max`, built for one invocation.
/// Values above `max` are rejected instead of silently answered.
#[derive(Clone, Debug)]
pub struct Sieve {
    table: Vec<bool>,
    max: u64,
}

impl Sieve {
    /// Fails with [`PredicateError::RangeTooLarge`] when `max > SIEVE_CAP`.
    pub fn up_to(max: u64) -> Result<Self, PredicateError> {
        if max > SIEVE_CAP {
            return Err(PredicateError::RangeTooLarge {
                max,
                cap: SIEVE_CAP,
            });
        }
        let len = max as usize + 1;
        let mut table = vec![true; len];
        table[0] = false;
        if len > 1 {
            table[1] = false;
        }
        let mut p = 2usize;
        while p * p < len {
            if table[p] {
                let mut m = p * p;
                while m < len {
                    table[m] = false;
                    m += p;
                }
            }
            p += 1;
        }
        Ok(Self { table, max })
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

impl PrimePredicate for Sieve {
    #[inline]
    fn check(&self, n: u64) -> Result<bool, PredicateError> {
        if n > self.max {
            return Err(PredicateError::OutOfRange {
                value: n,
                max: self.max,
            });
        }
        Ok(self.table[n as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values() {
        let primes: Vec<u64> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn squares_of_primes_are_composite() {
        for p in [5u64, 7, 11, 13, 101, 7919] {
            assert!(!is_prime(p * p), "{}", p * p);
        }
        assert!(is_prime(7919));
    }

    #[test]
    fn sieve_agrees_with_trial_division() {
        let sieve = Sieve::up_to(5000).unwrap();
        for n in 0..=5000 {
            assert_eq!(sieve.check(n).unwrap(), is_prime(n), "n = {n}");
        }
    }

    #[test]
    fn sieve_rejects_values_past_its_range() {
        let sieve = Sieve::up_to(10).unwrap();
        assert_eq!(
            sieve.check(11),
            Err(PredicateError::OutOfRange { value: 11, max: 10 })
        );
    }

    #[test]
    fn sieve_range_is_capped() {
        for max in [SIEVE_CAP + 1, u64::MAX] {
            assert_eq!(
                Sieve::up_to(max).err(),
                Some(PredicateError::RangeTooLarge {
                    max,
                    cap: SIEVE_CAP
                })
            );
        }
        let tiny = Sieve::up_to(0).unwrap();
        assert_eq!(tiny.check(0), Ok(false));
    }

    #[test]
    fn closures_are_predicates() {
        let odd = |n: u64| n % 2 == 1;
        assert_eq!(odd.check(3), Ok(true));
        assert_eq!(odd.check(4), Ok(false));
    }
}
