pub mod data {
    pub mod datasources {
        pub mod receipt_loader_datasource;
        pub mod receipt_validation_datasource;
    }
    pub(crate) mod models {
        pub(crate) mod verify_receipt {
            pub(crate) mod request_model;
        }
    }
    pub mod repositories {
        pub mod purchase_coordinator_impl;
    }
}

pub mod domain {
    pub mod entities {
        pub mod product;
        pub mod receipt;
        pub mod subscription;
        pub mod transaction;
    }
    pub mod repositories {
        pub mod payment_queue;
        pub mod purchase_coordinator;
        pub mod receipt_refresher;
        pub mod subscription_evaluator;
    }
}

pub(crate) mod constants;
pub mod errors;
pub mod util;
