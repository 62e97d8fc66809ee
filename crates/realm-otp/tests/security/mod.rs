mod secret_masking;
