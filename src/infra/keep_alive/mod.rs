pub mod keep_alive_server;
