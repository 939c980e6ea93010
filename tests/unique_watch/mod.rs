mod exclusive_key_case1;
mod plain_containers;
