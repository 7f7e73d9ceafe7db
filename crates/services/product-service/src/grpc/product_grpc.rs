//! gRPC implementation for ProductService.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use uuid::Uuid;

use common::AppError;
use domain::{
    Actor, CreateProduct, EnrichedProduct, PageMeta, PageRequest, ProductReference, ProductSummary,
    UpdateProduct, UserSummary, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE,
};
use proto::product::{
    self as pb, product_service_server::ProductService as ProductServiceProto,
    CreateProductRequest, FindAllProductsRequest, FindProductByCodeRequest, FindProductRequest,
    ProductPage, ProductReferenceList, ProductResponse, ProductSummaryPage, UpdateProductRequest,
    ValidateProductsRequest,
};

use crate::service::ProductService;

/// gRPC service wrapper for ProductService.
pub struct ProductGrpcService {
    service: Arc<dyn ProductService>,
}

impl ProductGrpcService {
    /// Create a new gRPC service wrapper.
    pub fn new(service: Arc<dyn ProductService>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl ProductServiceProto for ProductGrpcService {
    async fn create(
        &self,
        request: Request<CreateProductRequest>,
    ) -> Result<Response<ProductResponse>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;
        let input = CreateProduct {
            name: req.name,
            price: req.price,
        };

        let product = self.service.create(input, &actor).await.map_err(Status::from)?;
        Ok(Response::new(product_to_proto(product)))
    }

    async fn find_all(
        &self,
        request: Request<FindAllProductsRequest>,
    ) -> Result<Response<ProductPage>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;
        let page = page_from_proto(req.pagination)?;

        let result = self.service.find_all(page, &actor).await.map_err(Status::from)?;
        Ok(Response::new(ProductPage {
            meta: Some(meta_to_proto(&result.meta)),
            data: result.data.into_iter().map(product_to_proto).collect(),
        }))
    }

    async fn find_all_summary(
        &self,
        request: Request<FindAllProductsRequest>,
    ) -> Result<Response<ProductSummaryPage>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;
        let page = page_from_proto(req.pagination)?;

        let result = self
            .service
            .find_all_summary(page, &actor)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(ProductSummaryPage {
            meta: Some(meta_to_proto(&result.meta)),
            data: result.data.iter().map(summary_to_proto).collect(),
        }))
    }

    async fn find_one(
        &self,
        request: Request<FindProductRequest>,
    ) -> Result<Response<ProductResponse>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;
        let id = parse_uuid(&req.id)?;

        let product = self.service.find_one(id, &actor).await.map_err(Status::from)?;
        Ok(Response::new(product_to_proto(product)))
    }

    async fn find_one_by_code(
        &self,
        request: Request<FindProductByCodeRequest>,
    ) -> Result<Response<ProductResponse>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;

        let product = self
            .service
            .find_one_by_code(req.code, &actor)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(product_to_proto(product)))
    }

    async fn find_one_summary(
        &self,
        request: Request<FindProductRequest>,
    ) -> Result<Response<pb::ProductSummary>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;
        let id = parse_uuid(&req.id)?;

        let summary = self
            .service
            .find_one_summary(id, &actor)
            .await
            .map_err(Status::from)?;
        Ok(Response::new(summary_to_proto(&summary)))
    }

    async fn validate(
        &self,
        request: Request<ValidateProductsRequest>,
    ) -> Result<Response<ProductReferenceList>, Status> {
        let req = request.into_inner();
        let ids = req
            .ids
            .iter()
            .map(|id| parse_uuid(id))
            .collect::<Result<Vec<_>, _>>()?;

        let products = self.service.validate_batch(ids).await.map_err(Status::from)?;
        Ok(Response::new(ProductReferenceList {
            products: products.iter().map(reference_to_proto).collect(),
        }))
    }

    async fn update(
        &self,
        request: Request<UpdateProductRequest>,
    ) -> Result<Response<ProductResponse>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;
        let input = UpdateProduct {
            id: parse_uuid(&req.id)?,
            name: req.name,
            price: req.price,
        };

        let product = self.service.update(input, &actor).await.map_err(Status::from)?;
        Ok(Response::new(product_to_proto(product)))
    }

    async fn restore(
        &self,
        request: Request<FindProductRequest>,
    ) -> Result<Response<ProductResponse>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;
        let id = parse_uuid(&req.id)?;

        let product = self.service.restore(id, &actor).await.map_err(Status::from)?;
        Ok(Response::new(product_to_proto(product)))
    }

    async fn remove(
        &self,
        request: Request<FindProductRequest>,
    ) -> Result<Response<ProductResponse>, Status> {
        let req = request.into_inner();
        let actor = actor_from_proto(req.actor)?;
        let id = parse_uuid(&req.id)?;

        let product = self.service.remove(id, &actor).await.map_err(Status::from)?;
        Ok(Response::new(product_to_proto(product)))
    }
}

/// Parse UUID from string.
fn parse_uuid(s: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(s).map_err(|_| Status::invalid_argument("Invalid UUID format"))
}

/// Every product operation except `validate` runs on behalf of an actor.
fn actor_from_proto(actor: Option<pb::Actor>) -> Result<Actor, Status> {
    let actor = actor.ok_or_else(|| Status::invalid_argument("Actor is required"))?;
    let id = parse_uuid(&actor.id)?;
    Ok(Actor::with_role_names(id, &actor.roles))
}

fn page_from_proto(pagination: Option<pb::Pagination>) -> Result<PageRequest, Status> {
    let pagination = pagination.unwrap_or_default();
    let page = pagination.page.unwrap_or(DEFAULT_PAGE_NUMBER);
    let limit = pagination.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    PageRequest::new(page, limit).map_err(|e| Status::from(AppError::from(e)))
}

fn meta_to_proto(meta: &PageMeta) -> pb::PageMeta {
    pb::PageMeta {
        total: meta.total,
        page: meta.page,
        last_page: meta.last_page,
    }
}

fn user_to_proto(user: UserSummary) -> pb::UserSummary {
    pb::UserSummary {
        id: user.id.to_string(),
        name: user.name,
        email: user.email,
    }
}

/// Convert an enriched product to the full response; unresolved users are left unset.
fn product_to_proto(product: EnrichedProduct) -> ProductResponse {
    ProductResponse {
        id: product.id.to_string(),
        name: product.name,
        price: product.price.to_string(),
        code: product.code,
        created_at: product.created_at.to_rfc3339(),
        created_by: product.created_by.map(user_to_proto),
        updated_by: product.updated_by.map(user_to_proto),
        deleted_at: product.deleted_at.map(|dt| dt.to_rfc3339()),
        deleted_by: product.deleted_by.map(user_to_proto),
    }
}

fn summary_to_proto(summary: &ProductSummary) -> pb::ProductSummary {
    pb::ProductSummary {
        id: summary.id.to_string(),
        name: summary.name.clone(),
        price: summary.price.to_string(),
        code: summary.code,
        created_at: summary.created_at.to_rfc3339(),
    }
}

fn reference_to_proto(reference: &ProductReference) -> pb::ProductReference {
    pb::ProductReference {
        id: reference.id.to_string(),
        name: reference.name.clone(),
        code: reference.code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    use crate::client::MockUserDirectory;
    use crate::repository::InMemoryProductStore;
    use crate::service::ProductManager;

    fn grpc_service() -> ProductGrpcService {
        let mut directory = MockUserDirectory::new();
        directory.expect_find_summaries().returning(|ids| {
            Ok(ids
                .iter()
                .map(|id| UserSummary {
                    id: *id,
                    name: "Ann".to_string(),
                    email: "ann@example.com".to_string(),
                })
                .collect())
        });

        let store = Arc::new(InMemoryProductStore::new());
        let service = ProductManager::new(store, Arc::new(directory));
        ProductGrpcService::new(Arc::new(service))
    }

    fn actor(roles: &[&str]) -> Option<pb::Actor> {
        Some(pb::Actor {
            id: Uuid::new_v4().to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        })
    }

    async fn create(service: &ProductGrpcService, name: &str, price: &str) -> ProductResponse {
        service
            .create(Request::new(CreateProductRequest {
                actor: actor(&["user"]),
                name: name.to_string(),
                price: price.to_string(),
            }))
            .await
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_page_defaults() {
        let page = page_from_proto(None).unwrap();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);

        let page = page_from_proto(Some(pb::Pagination {
            page: Some(3),
            limit: None,
        }))
        .unwrap();
        assert_eq!(page.page(), 3);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_zero_page_is_invalid_argument() {
        let status = page_from_proto(Some(pb::Pagination {
            page: Some(0),
            limit: Some(10),
        }))
        .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_oversized_page_is_invalid_argument() {
        let service = grpc_service();

        for (page, limit) in [(1, 1_000), (2, u64::MAX), (u64::MAX, 10)] {
            let status = service
                .find_all(Request::new(FindAllProductsRequest {
                    actor: actor(&["user"]),
                    pagination: Some(pb::Pagination {
                        page: Some(page),
                        limit: Some(limit),
                    }),
                }))
                .await
                .unwrap_err();
            assert_eq!(status.code(), Code::InvalidArgument, "page {} limit {}", page, limit);
        }
    }

    #[test]
    fn test_missing_actor_is_invalid_argument() {
        let status = actor_from_proto(None).unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);

        let status = actor_from_proto(Some(pb::Actor {
            id: "not-a-uuid".to_string(),
            roles: vec![],
        }))
        .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[test]
    fn test_actor_roles() {
        let admin = actor_from_proto(actor(&["user", "admin"])).unwrap();
        assert!(admin.is_admin());

        let user = actor_from_proto(actor(&["user"])).unwrap();
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn test_create_returns_enriched_response() {
        let service = grpc_service();
        let product = create(&service, "Lamp", "12.5").await;

        assert_eq!(product.name, "Lamp");
        assert_eq!(product.price, "12.50000000");
        assert_eq!(product.created_by.map(|u| u.name), Some("Ann".to_string()));
        assert!(product.updated_by.is_none());
        assert!(product.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_create_with_zero_price_is_invalid_argument() {
        let service = grpc_service();
        let status = service
            .create(Request::new(CreateProductRequest {
                actor: actor(&["user"]),
                name: "Lamp".to_string(),
                price: "0".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_remove_twice_is_failed_precondition() {
        let service = grpc_service();
        let product = create(&service, "Lamp", "3").await;

        let request = || {
            Request::new(FindProductRequest {
                actor: actor(&["admin"]),
                id: product.id.clone(),
            })
        };

        let removed = service.remove(request()).await.unwrap().into_inner();
        assert!(removed.deleted_at.is_some());
        assert!(removed.deleted_by.is_some());

        let status = service.remove(request()).await.unwrap_err();
        assert_eq!(status.code(), Code::FailedPrecondition);
    }

    #[tokio::test]
    async fn test_find_one_with_malformed_id() {
        let service = grpc_service();
        let status = service
            .find_one(Request::new(FindProductRequest {
                actor: actor(&["user"]),
                id: "42".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_find_one_unknown_is_not_found() {
        let service = grpc_service();
        let status = service
            .find_one(Request::new(FindProductRequest {
                actor: actor(&["user"]),
                id: Uuid::new_v4().to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn test_find_all_summary_page() {
        let service = grpc_service();
        for i in 0..3 {
            create(&service, &format!("Item {}", i), "1").await;
        }

        let page = service
            .find_all_summary(Request::new(FindAllProductsRequest {
                actor: actor(&["user"]),
                pagination: Some(pb::Pagination {
                    page: Some(2),
                    limit: Some(2),
                }),
            }))
            .await
            .unwrap()
            .into_inner();

        let meta = page.meta.unwrap();
        assert_eq!((meta.total, meta.page, meta.last_page), (3, 2, 2));
        assert_eq!(page.data.len(), 1);
    }

    #[tokio::test]
    async fn test_validate_rejects_missing_products() {
        let service = grpc_service();
        let product = create(&service, "Lamp", "3").await;

        let ok = service
            .validate(Request::new(ValidateProductsRequest {
                ids: vec![product.id.clone(), product.id.clone()],
            }))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(ok.products.len(), 1);
        assert_eq!(ok.products[0].code, product.code);

        let status = service
            .validate(Request::new(ValidateProductsRequest {
                ids: vec![product.id, Uuid::new_v4().to_string()],
            }))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let service = grpc_service();
        let product = create(&service, "Lamp", "3").await;

        let updated = service
            .update(Request::new(UpdateProductRequest {
                actor: actor(&["user"]),
                id: product.id,
                name: None,
                price: Some("4.25".to_string()),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(updated.name, "Lamp");
        assert_eq!(updated.price, "4.25000000");
        assert!(updated.updated_by.is_some());
    }
}
