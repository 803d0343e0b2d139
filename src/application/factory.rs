//! Item factories used by `create`.

use uuid::Uuid;

use crate::domain::{FieldNames, Item};

/// Where a new item is about to be placed.
#[derive(Debug, Clone, Copy)]
pub struct CreateContext<'a> {
    /// Parent payload, `None` for a new root
    pub parent: Option<&'a Item>,
    /// Depth the new item will have (roots are 0)
    pub depth: usize,
    /// Caller supplied width, or the number of existing siblings
    pub width: usize,
}

/// Produces candidate items; the editor fills in the parent field afterwards.
pub trait ItemFactory {
    fn create(&mut self, ctx: &CreateContext<'_>) -> Item;
}

impl<F> ItemFactory for F
where
    F: FnMut(&CreateContext<'_>) -> Item,
{
    fn create(&mut self, ctx: &CreateContext<'_>) -> Item {
        self(ctx)
    }
}

/// Creates items with a random UUID v4 id and a display name.
#[derive(Debug, Clone)]
pub struct DefaultItemFactory {
    names: FieldNames,
    name: String,
}

impl DefaultItemFactory {
    pub fn new(names: FieldNames) -> Self {
        Self {
            names,
            name: "New item".into(),
        }
    }

    /// Use `name` for every created item.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl ItemFactory for DefaultItemFactory {
    fn create(&mut self, _ctx: &CreateContext<'_>) -> Item {
        Item::new()
            .with(self.names.id.clone(), Uuid::new_v4().to_string())
            .with(self.names.name.clone(), self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_factory_when_creating_then_ids_are_unique() {
        let names = FieldNames::default();
        let mut factory = DefaultItemFactory::new(names.clone()).with_name("todo");
        let ctx = CreateContext {
            parent: None,
            depth: 0,
            width: 0,
        };

        let a = factory.create(&ctx);
        let b = factory.create(&ctx);

        assert!(a.id(&names).is_some());
        assert_ne!(a.id(&names), b.id(&names));
        assert_eq!(a.name(&names), Some("todo"));
    }
}
