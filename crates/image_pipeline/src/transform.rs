use anyhow::{Context, Result};
use std::marker::PhantomData;

/// Defines the core `Transform` trait for per-item processing steps.
///
/// A `Transform<I, O>` is a stateless operation converting an input of type
/// `I` to an output of type `O`. The pipeline invokes it concurrently from
/// multiple worker threads, each call on a distinct payload, so
/// implementations must be `Send + Sync` and keep no per-call mutable state.
///
/// Steps can be chained with `.then(...)` to build a composite transform
/// that the pipeline still sees as a single capability.
///
/// Note: `then()` works only when:
/// 1. **Types align**: `self: Transform<I, O>`, `next: Transform<O, M>`
/// 2. **Owned**: `Self: Sized` (no trait objects, must be concrete)
/// 3. **Thread-safe**: intermediate and output types must be `Send`
pub trait Transform<I, O>: Send + Sync {
    /// Applies the transformation to the input.
    fn apply(&self, input: I) -> Result<O>;

    #[inline]
    fn then<T, M>(self, next: T) -> Chain<Self, T, O>
    where
        Self: Sized,
        T: Transform<O, M>,
        O: Send,
        M: Send,
    {
        Chain {
            first: self,
            second: next,
            _marker: PhantomData,
        }
    }
}

/// A chain of two transforms (`A` -> `B`)
/// - `PhantomData<M>` enforces intermediate type alignment.
#[derive(Debug)]
pub struct Chain<A, B, M> {
    first: A,
    second: B,
    _marker: PhantomData<fn() -> M>,
}

impl<A, B, M> Chain<A, B, M> {
    /// Creates a new transform chain.
    /// Use [`Transform::then`] for better ergonomics.
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _marker: PhantomData,
        }
    }
}

impl<I, M, O, A, B> Transform<I, O> for Chain<A, B, M>
where
    A: Transform<I, M>,
    B: Transform<M, O>,
    M: Send,
{
    fn apply(&self, input: I) -> Result<O> {
        self.first
            .apply(input)
            .and_then(|mid| self.second.apply(mid))
            .with_context(|| {
                format!(
                    "Transform chain failed: {} → {} → {}",
                    std::any::type_name::<A>(),
                    std::any::type_name::<B>(),
                    std::any::type_name::<O>()
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct Brighten;
    impl Transform<u8, u8> for Brighten {
        fn apply(&self, input: u8) -> Result<u8> {
            Ok(input.saturating_add(10))
        }
    }

    struct Invert;
    impl Transform<u8, u8> for Invert {
        fn apply(&self, input: u8) -> Result<u8> {
            Ok(255 - input)
        }
    }

    #[test]
    fn test_chain_construction_using_then() -> Result<()> {
        let pipeline = Brighten.then(Invert);
        assert_eq!(pipeline.apply(100)?, 255 - 110);
        Ok(())
    }

    #[test]
    fn test_chain_error_context() {
        struct Fail;
        impl Transform<u8, u8> for Fail {
            fn apply(&self, _: u8) -> Result<u8> {
                Err(anyhow!("Test error"))
            }
        }

        let chain = Chain::new(Brighten, Fail);
        let err = chain.apply(1).unwrap_err();
        let msg = err.to_string();

        assert!(msg.contains("Transform chain failed"));
        assert!(msg.contains("Brighten"));
        assert!(msg.contains("Fail"));
    }
}
