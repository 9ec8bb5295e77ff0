use crate::{PithError, Value};

pub const DEFAULT_STACK_SIZE: usize = 256;

/// The value stack of a runtime. Pushing past `capacity` is an error.
#[derive(Debug, Clone)]
pub struct ExecutionState {
    stack: Vec<Value>,
    capacity: usize,
}

#[derive(Debug, Clone)]
pub struct ExecutionStateInfo {
    pub stack_size: usize,
}

impl Default for ExecutionStateInfo {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl ExecutionState {
    #[must_use]
    pub fn new(info: &ExecutionStateInfo) -> Self {
        Self {
            stack: Vec::with_capacity(info.stack_size),
            capacity: info.stack_size,
        }
    }

    /// Returns the active portion of the stack, bottom first
    #[must_use]
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push(&mut self, value: Value) -> Result<(), PithError> {
        if self.stack.len() >= self.capacity {
            return Err(PithError::StackOverflow {
                capacity: self.capacity,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&Value> {
        self.stack.last()
    }

    /// Removes the top n elements and returns them in push order.
    pub fn stack_pop_slice(&mut self, n: usize) -> Option<Vec<Value>> {
        let start = self.stack.len().checked_sub(n)?;
        Some(self.stack.split_off(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(size: usize) -> ExecutionState {
        ExecutionState::new(&ExecutionStateInfo { stack_size: size })
    }

    #[test]
    fn push_pop_in_lifo_order() {
        let mut s = state(4);
        s.push(1.0.into()).unwrap();
        s.push(2.0.into()).unwrap();
        assert_eq!(s.depth(), 2);
        assert_eq!(s.pop(), Some(Value::Number(2.0)));
        assert_eq!(s.pop(), Some(Value::Number(1.0)));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn overflow_is_reported() {
        let mut s = state(1);
        s.push(Value::Nil).unwrap();
        assert_eq!(
            s.push(Value::Nil),
            Err(PithError::StackOverflow { capacity: 1 })
        );
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn pop_slice_keeps_push_order() {
        let mut s = state(8);
        for n in 1..=4 {
            s.push(Value::Number(n as f64)).unwrap();
        }
        assert_eq!(s.peek(), Some(&Value::Number(4.0)));
        let top = s.stack_pop_slice(3).unwrap();
        assert_eq!(top, vec![2.0.into(), 3.0.into(), 4.0.into()]);
        assert_eq!(s.depth(), 1);
        assert!(s.stack_pop_slice(2).is_none());
    }
}
