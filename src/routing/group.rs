//! Route groups mounted under a shared prefix.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::method::Method;
use crate::http::response::HttpResponse;
use crate::routing::handler::{MiddlewareFn, RouteHandler, RouteRequest};

/// One route of a group, with its path relative to the group prefix.
pub struct GroupedRoute<S, D> {
    pub path: String,
    pub method: Method,
    pub binding: RouteHandler<S, D>,
}

impl<S, D> GroupedRoute<S, D> {
    pub fn new<F>(method: Method, path: &str, handler: F, middleware: Vec<MiddlewareFn<S, D>>) -> Self
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            path: path.to_string(),
            method,
            binding: RouteHandler {
                handler: Arc::new(handler),
                middleware,
            },
        }
    }

    pub fn get<F>(path: &str, handler: F, middleware: Vec<MiddlewareFn<S, D>>) -> Self
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Method::Get, path, handler, middleware)
    }

    pub fn post<F>(path: &str, handler: F, middleware: Vec<MiddlewareFn<S, D>>) -> Self
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Method::Post, path, handler, middleware)
    }

    pub fn put<F>(path: &str, handler: F, middleware: Vec<MiddlewareFn<S, D>>) -> Self
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Method::Put, path, handler, middleware)
    }

    pub fn patch<F>(path: &str, handler: F, middleware: Vec<MiddlewareFn<S, D>>) -> Self
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Method::Patch, path, handler, middleware)
    }

    pub fn delete<F>(path: &str, handler: F, middleware: Vec<MiddlewareFn<S, D>>) -> Self
    where
        F: for<'a> Fn(&'a mut RouteRequest<S, D>) -> BoxFuture<'a, Option<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(Method::Delete, path, handler, middleware)
    }
}

/// An ordered set of routes registered together.
pub struct RouteGroup<S, D> {
    routes: Vec<GroupedRoute<S, D>>,
}

impl<S, D> Default for RouteGroup<S, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, D> RouteGroup<S, D> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn route(mut self, route: GroupedRoute<S, D>) -> Self {
        self.routes.push(route);
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn into_routes(self) -> Vec<GroupedRoute<S, D>> {
        self.routes
    }
}

impl<S, D> FromIterator<GroupedRoute<S, D>> for RouteGroup<S, D> {
    fn from_iter<I: IntoIterator<Item = GroupedRoute<S, D>>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}
