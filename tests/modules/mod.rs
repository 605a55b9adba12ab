mod cmr_client;
mod redirect;
