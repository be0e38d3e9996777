use crate::yaml::RoutesConfig;

/// What the guard needs to know about a navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub path: String,
    pub name: Option<String>,
    pub title: Option<String>,
    pub public: bool,
    pub requires_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param,
}

#[derive(Debug, Clone)]
struct RouteDefinition {
    segments: Vec<Segment>,
    name: String,
    title: Option<String>,
    requires_admin: bool,
}

impl RouteDefinition {
    fn matches(&self, path_segments: &[&str]) -> bool {
        self.segments.len() == path_segments.len()
            && self.segments.iter().zip(path_segments).all(|(segment, part)| match segment {
                Segment::Static(expected) => expected == part,
                Segment::Param => !part.is_empty(),
            })
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Drops query, fragment and trailing slash: `/admin/orders/?page=2` -> `/admin/orders`.
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

const PUBLIC_ROUTES: &[(&str, &str)] =
    &[("/login", "login"), ("/signup", "signup"), ("/password", "password")];

const USER_ROUTES: &[(&str, &str, &str)] = &[
    ("order", "Order", "Order"),
    ("order/:id", "ProductDetail", "Order / Product detail"),
    ("cart", "Cart", "Cart"),
    ("order-history", "Invoice", "Receipts"),
    ("order-history/:id", "OrderDetail", "Receipts / Receipt detail"),
    ("inquiries", "inquiryList", "Settings / Inquiries"),
    ("inquiries/create", "inquiryCreate", "Settings / Inquiries / New inquiry"),
    ("mypage", "mypage", "My page / Edit profile"),
    ("dashboard", "dashboard", "My page / Dashboard"),
];

const ADMIN_ROUTES: &[(&str, &str, &str)] = &[
    ("", "adminDashboard", "Home / Dashboard"),
    ("orders", "adminOrderList", "Trading / Customer orders"),
    ("orders/:id", "adminOrderDetail", "Trading / Order detail"),
    ("inquiries", "adminInquiryList", "Admin / Inquiries"),
    ("masterData", "adminMasterDataList", "Home / Master data / Items"),
    ("masterData/:skuNo", "adminMasterDataDetail", "Home / Master data / Items / Item detail"),
    ("masterData/edit/:skuNo", "MasterEdit", ""),
    ("notifications", "adminNotification", "Notifications"),
    ("purchaseOrder", "purchaseOrder", "Purchase orders"),
    ("lots", "adminLotList", "Home / LOT management / LOT list"),
    ("discard/register", "adminDiscardRegister", "Home / Inventory / Register discard"),
    ("discard/list", "adminDiscardList", "Home / Inventory / Discard history"),
    ("approval", "adminMemberList", "Home / Members / Approval"),
];

/// Client-side route table. Paths may contain `:param` segments.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    public_paths: Vec<String>,
}

impl RouteTable {
    pub fn new(public_paths: Vec<String>) -> Self {
        let public_paths = public_paths.iter().map(|path| normalize_path(path)).collect();
        Self { routes: Vec::new(), public_paths }
    }

    /// The application's routes: public pages, the user area under `/` and the
    /// admin area under `/admin`.
    pub fn standard(config: &RoutesConfig) -> Self {
        let mut table = Self::new(config.public.clone());

        for (path, name) in PUBLIC_ROUTES {
            table.add(path, name, None, false);
        }

        for (path, name, title) in USER_ROUTES {
            table.add(&format!("/{}", path), name, Some(*title), false);
        }

        for (path, name, title) in ADMIN_ROUTES {
            let title = if title.is_empty() { None } else { Some(*title) };
            table.add(&format!("/admin/{}", path), name, title, true);
        }

        table
    }

    pub fn add(&mut self, path: &str, name: &str, title: Option<&str>, requires_admin: bool) {
        let segments = split_segments(path)
            .into_iter()
            .map(|part| match part.strip_prefix(':') {
                Some(_) => Segment::Param,
                None => Segment::Static(part.to_string()),
            })
            .collect();

        self.routes.push(RouteDefinition {
            segments,
            name: name.to_string(),
            title: title.map(str::to_string),
            requires_admin,
        });
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.public_paths.iter().any(|public| *public == path)
    }

    /// Resolves a path to its meta. Unknown paths are neither public nor admin-only.
    pub fn resolve(&self, path: &str) -> RouteMeta {
        let normalized = normalize_path(path);
        let path_segments = split_segments(&normalized);
        let public = self.is_public(&normalized);

        let route = self.routes.iter().find(|route| route.matches(&path_segments));

        RouteMeta {
            name: route.map(|route| route.name.clone()),
            title: route.and_then(|route| route.title.clone()),
            requires_admin: route.is_some_and(|route| route.requires_admin),
            public,
            path: normalized,
        }
    }
}
