mod window_host;
