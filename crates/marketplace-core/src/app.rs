use std::sync::Arc;

use axum::Router;

use crate::access::{Actor, ActorId};
use crate::accounts::{account_router, AccountError, AccountService, OwnershipTransfer};
use crate::auth::{AuthGuard, TokenCodec};
use crate::cache::CacheTtls;
use crate::clock::Clock;
use crate::listings::{listing_router, ImageStore, PropertyService};
use crate::store::MarketplaceStore;

/// The wired-up marketplace: one store, one credential codec, one listing cache.
pub struct Marketplace<S, B> {
    store: Arc<S>,
    guard: AuthGuard<S>,
    accounts: AccountService<S>,
    listings: PropertyService<S, B>,
}

impl<S, B> Marketplace<S, B>
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    pub fn new(
        store: Arc<S>,
        images: Arc<B>,
        codec: TokenCodec,
        ttls: CacheTtls,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard: AuthGuard::new(store.clone(), codec.clone()),
            accounts: AccountService::new(store.clone(), codec, clock.clone()),
            listings: PropertyService::new(store.clone(), images, ttls, clock),
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn guard(&self) -> &AuthGuard<S> {
        &self.guard
    }

    pub fn accounts(&self) -> &AccountService<S> {
        &self.accounts
    }

    pub fn listings(&self) -> &PropertyService<S, B> {
        &self.listings
    }

    /// Delete `target_id`, transfer what it owned to `manager`, and clear every cached listing
    /// view, since any of them may name the deleted account.
    pub fn delete_member(
        &self,
        manager: &Actor,
        target_id: &ActorId,
    ) -> Result<OwnershipTransfer, AccountError> {
        let transfer = self.accounts.delete_member(manager, target_id)?;
        self.listings.invalidate_all();
        Ok(transfer)
    }
}

/// Account and listing routes merged under one router.
pub fn marketplace_router<S, B>(marketplace: Arc<Marketplace<S, B>>) -> Router
where
    S: MarketplaceStore + 'static,
    B: ImageStore + 'static,
{
    account_router(marketplace.clone()).merge(listing_router(marketplace))
}
