//! Signature transform programs and their interpreter.

use crate::error::{Error, Result};

/// One primitive step of a signature transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureOp {
    /// Reverse the whole character array.
    Reverse,
    /// Swap position 0 with position `n % len`.
    Swap(usize),
    /// Drop the first `n` characters.
    Slice(usize),
}

/// Ordered list of operations derived from one player asset version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureProgram {
    ops: Vec<SignatureOp>,
}

impl SignatureProgram {
    pub fn new(ops: Vec<SignatureOp>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[SignatureOp] {
        &self.ops
    }

    /// Run the program left to right over a ciphered signature.
    pub fn apply(&self, ciphered: &str) -> Result<String> {
        let mut chars: Vec<char> = ciphered.chars().collect();

        for op in &self.ops {
            match *op {
                SignatureOp::Reverse => chars.reverse(),
                SignatureOp::Swap(n) => {
                    if chars.is_empty() {
                        return Err(Error::Decryption(
                            "swap on an empty signature".to_string(),
                        ));
                    }
                    let target = n % chars.len();
                    chars.swap(0, target);
                }
                SignatureOp::Slice(n) => {
                    let n = n.min(chars.len());
                    chars.drain(..n);
                }
            }
        }

        Ok(chars.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_each_op() {
        let reverse = SignatureProgram::new(vec![SignatureOp::Reverse]);
        assert_eq!(reverse.apply("abcdef").unwrap(), "fedcba");

        let swap = SignatureProgram::new(vec![SignatureOp::Swap(3)]);
        assert_eq!(swap.apply("abcdef").unwrap(), "dbcaef");

        // Index wraps modulo length
        let swap_wrapped = SignatureProgram::new(vec![SignatureOp::Swap(8)]);
        assert_eq!(swap_wrapped.apply("abcdef").unwrap(), "cbadef");

        let slice = SignatureProgram::new(vec![SignatureOp::Slice(2)]);
        assert_eq!(slice.apply("abcdef").unwrap(), "cdef");
    }

    #[test]
    fn test_apply_sequence_left_to_right() {
        let program = SignatureProgram::new(vec![
            SignatureOp::Swap(3),
            SignatureOp::Reverse,
            SignatureOp::Slice(2),
        ]);
        // dbcaef -> feacbd -> acbd
        assert_eq!(program.apply("abcdef").unwrap(), "acbd");
    }

    #[test]
    fn test_slice_past_end_empties() {
        let program = SignatureProgram::new(vec![SignatureOp::Slice(10)]);
        assert_eq!(program.apply("abc").unwrap(), "");
    }

    #[test]
    fn test_swap_on_empty_fails() {
        let program = SignatureProgram::new(vec![SignatureOp::Swap(1)]);
        assert!(matches!(program.apply(""), Err(Error::Decryption(_))));
    }
}
