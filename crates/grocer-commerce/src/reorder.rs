//! Local reordering of display lists.

use crate::error::CommerceError;

/// Move the element at `from` to position `to`, shifting the ones between.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), CommerceError> {
    let len = items.len();
    if from >= len {
        return Err(CommerceError::PositionOutOfRange { index: from, len });
    }
    if to >= len {
        return Err(CommerceError::PositionOutOfRange { index: to, len });
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Rows that carry a manual display position.
pub trait Positioned {
    type Id: Clone;

    fn position_id(&self) -> &Self::Id;
}

macro_rules! impl_positioned {
    ($ty:ty, $id:ty) => {
        impl Positioned for $ty {
            type Id = $id;

            fn position_id(&self) -> &Self::Id {
                &self.id
            }
        }
    };
}

impl_positioned!(crate::catalog::Product, crate::ids::ProductId);
impl_positioned!(crate::catalog::Category, crate::ids::CategoryId);
impl_positioned!(crate::content::HomepageSection, crate::ids::SectionId);
impl_positioned!(crate::content::HeroSlide, crate::ids::SlideId);
impl_positioned!(crate::checkout::ShippingLocation, crate::ids::LocationId);

/// Ids in list order, as sent to a reorder endpoint.
pub fn ordered_ids<T: Positioned>(items: &[T]) -> Vec<T::Id> {
    items.iter().map(|i| i.position_id().clone()).collect()
}
