use clinassist_core::Page;
use clinassist_core::api_paths;
use clinassist_core::models::therapeute::Therapeute;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::cache::{Collection, MergeMode};
use crate::context::{ServiceContext, check_page_size, page_query};
use crate::error::ServiceError;

pub struct TherapeuteService {
    ctx: ServiceContext,
    cache: Collection<Therapeute>,
}

impl TherapeuteService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            cache: Collection::new(),
        }
    }

    pub fn cache(&self) -> &Collection<Therapeute> {
        &self.cache
    }

    pub fn therapeutes(&self) -> Vec<Therapeute> {
        self.cache.items()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Therapeute>> {
        self.cache.subscribe()
    }

    pub fn selected(&self) -> Option<Therapeute> {
        self.cache.selected()
    }

    pub async fn list(&self, page: u32, size: u32, search: Option<&str>) -> Page<Therapeute> {
        match self.try_list(page, size, search).await {
            Ok(result) => result,
            Err(e) => {
                warn!(page, size, error = %e, "failed to list therapists");
                Page::empty(page, size)
            }
        }
    }

    /// Therapists are never scoped; paging and search are the backend's.
    pub async fn try_list(
        &self,
        page: u32,
        size: u32,
        search: Option<&str>,
    ) -> Result<Page<Therapeute>, ServiceError> {
        check_page_size(size)?;
        let ticket = self.cache.begin();
        let result = match search.map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => self.fetch_search(term, page, size).await?,
            None => {
                self.ctx
                    .api
                    .get(api_paths::THERAPEUTES, &page_query(page, size))
                    .await?
            }
        };
        ticket.publish(result.content.clone());
        Ok(result)
    }

    /// Backend search over names and specialization.
    pub async fn search(
        &self,
        term: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<Therapeute>, ServiceError> {
        check_page_size(size)?;
        self.fetch_search(term.trim(), page, size).await
    }

    async fn fetch_search(
        &self,
        term: &str,
        page: u32,
        size: u32,
    ) -> Result<Page<Therapeute>, ServiceError> {
        let mut query = page_query(page, size);
        query.push(("q", term.to_string()));
        Ok(self.ctx.api.get(api_paths::THERAPEUTES_SEARCH, &query).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Therapeute, ServiceError> {
        let therapeute: Therapeute = self.ctx.api.get(api_paths::therapeute(id), &[]).await?;
        self.cache.select(Some(therapeute.clone()));
        Ok(therapeute)
    }

    /// Therapists currently accepting sessions. Failures yield an empty
    /// list.
    pub async fn available(&self) -> Vec<Therapeute> {
        match self
            .ctx
            .api
            .get(api_paths::THERAPEUTES_AVAILABLE, &[])
            .await
        {
            Ok(therapeutes) => therapeutes,
            Err(e) => {
                warn!(error = %e, "failed to load available therapists");
                Vec::new()
            }
        }
    }

    /// The therapist record of the signed-in user, recorded on the session.
    pub async fn current(&self) -> Result<Therapeute, ServiceError> {
        let therapeute: Therapeute = self.ctx.api.get(api_paths::THERAPEUTE_ME, &[]).await?;
        self.ctx.session.set_current_therapeute(therapeute.clone())?;
        Ok(therapeute)
    }

    pub async fn by_user(&self, user_id: i64) -> Result<Therapeute, ServiceError> {
        Ok(self
            .ctx
            .api
            .get(api_paths::therapeute_by_user(user_id), &[])
            .await?)
    }

    pub async fn update_availability(
        &self,
        id: i64,
        available: bool,
    ) -> Result<Therapeute, ServiceError> {
        let therapeute: Therapeute = self
            .ctx
            .api
            .patch(
                api_paths::therapeute_availability(id),
                &[("available", available.to_string())],
            )
            .await?;
        info!(therapeute_id = id, available, "availability updated");
        self.cache.merge(therapeute.clone(), MergeMode::Replace);
        Ok(therapeute)
    }
}
