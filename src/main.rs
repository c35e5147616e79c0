use init::server_init::server_init_proc;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// modules tree
pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
}
pub mod docs;
pub mod schema;
pub mod dto {
    pub mod requests {
        pub mod user {
            pub mod check_email_request;
        }
    }
    pub mod responses {
        pub mod response_data;
        pub mod user {
            pub mod check_email_response;
        }
    }
}
pub mod errors {
    pub mod code_error;
}
pub mod handlers {
    pub mod server {
        pub mod fallback;
        pub mod healthcheck;
        pub mod root;
    }
    pub mod user {
        pub mod check_email;
    }
}
pub mod init {
    pub mod config;
    pub mod logging;
    pub mod server_init;
    pub mod state;
}
pub mod routers {
    pub mod main_router;
    pub mod middleware {
        pub mod logging;
    }
}
pub mod services {
    pub mod user_service;
}
pub mod util {
    pub mod extract {
        pub mod request_params;
    }
    pub mod time {
        pub mod duration_formatter;
        pub mod now;
    }
}

// main function
#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let start = tokio::time::Instant::now();
    server_init_proc(start).await
}
