use std::any::Any;

/// A value stored in [`crate::StateCtx`].
///
/// States are looked up by their concrete type. A state that commands need
/// to read must return a clone from [`State::snapshot`].
pub trait State: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Cloned copy handed to commands; `None` keeps the state UI-only.
    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        None
    }

    /// Replace `self` with a value published by a command.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Shared body for [`State::assign_box`].
///
/// Mismatched types are ignored and logged.
pub fn state_assign_impl<T: State>(target: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *target = *value,
        Err(_) => log::warn!(
            "ignored update of mismatched type for {}",
            std::any::type_name::<T>()
        ),
    }
}
