//! Episode list addressing.
//!
//! Episode lists are served in pages of [`PAGE_SIZE`] rows. A novel whose
//! first episode is a prologue numbers it `EP.0`, otherwise numbering starts
//! at `EP.1`.

use crate::Error;

/// Rows per episode-list page.
pub const PAGE_SIZE: u32 = 20;

/// Where an episode sits in the paged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeAddress {
    /// 1-based page number.
    pub page: u32,
    /// 1-based row index within the page.
    pub index: u32,
}

/// Map an episode ordinal to its list page and in-page row.
///
/// The row arithmetic for pages after the first is the one the list
/// consumers are written against; do not simplify it.
///
/// # Errors
///
/// Returns `Error::InvalidInput` when ordinal 0 is requested for a novel
/// without a prologue.
pub fn locate(ordinal: u32, has_prologue: bool) -> Result<EpisodeAddress, Error> {
    if has_prologue {
        let page = ordinal / PAGE_SIZE + 1;
        let index = if page == 1 { ordinal + 1 } else { (ordinal % PAGE_SIZE) * (page - 1) + 1 };
        return Ok(EpisodeAddress { page, index });
    }

    if ordinal == 0 {
        return Err(Error::InvalidInput("novel has no prologue; episode numbering starts at 1".into()));
    }

    let page = ordinal.div_ceil(PAGE_SIZE);
    let index = if page == 1 { ordinal } else { ordinal % (PAGE_SIZE * (page - 1)) };
    Ok(EpisodeAddress { page, index })
}
